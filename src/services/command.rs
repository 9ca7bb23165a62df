//! Desktop alerts through an external command such as `notify-send`

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use super::notifier::{Notice, Notifier};

/// Runs `<program> <title> <message>` for every alert.
///
/// The command is spawned on the current tokio runtime and never awaited by
/// the caller, so a slow notification daemon cannot stall a timer tick.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, notice: Notice) {
        let program = self.program.clone();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = run_notify_command(&program, notice.title(), notice.message()).await {
                        warn!("{}", e);
                    }
                });
            }
            Err(_) => warn!("No runtime available, skipping {} for {:?}", program, notice),
        }
    }

    fn set_badge(&self, _text: &str) {}
}

/// Execute the notification command once
pub async fn run_notify_command(program: &str, title: &str, message: &str) -> Result<(), String> {
    debug!("Running {} for {:?}", program, title);

    let output = Command::new(program)
        .args([title, message])
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", program, stderr));
    }

    Ok(())
}

/// Check that the notification command can be launched at all
pub async fn check_command_available(program: &str) -> Result<(), String> {
    Command::new(program)
        .arg("--version")
        .output()
        .await
        .map_err(|_| format!("{} is not available; desktop alerts are disabled", program))?;

    info!("{} is available", program);
    Ok(())
}
