use radarctl::ipc::Command;
use radarctl::target::TargetPath;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Show,
    Hide,
    Target(TargetPath),
    ConfigReload,
}

impl From<Command> for AppEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::Show => AppEvent::Show,
            Command::Hide => AppEvent::Hide,
            Command::Target(path) => AppEvent::Target(path),
        }
    }
}
