use std::process::Output;
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use serde::Deserialize;
use tabwright_core::{TabRef, WindowId};
use tokio::process::Command;

use crate::directory::{DirectoryError, TabDirectory};

pub const DEFAULT_BROWSER: &str = "Google Chrome";

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Application name as known to AppleScript.
    pub application: String,
    /// Upper bound for one osascript invocation.
    pub script_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            application: DEFAULT_BROWSER.to_string(),
            script_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptTab {
    title: String,
    url: String,
    window_index: u32,
    tab_index: u32,
    window_id: u64,
}

/// Tab directory for a Chromium browser on macOS, driven through `osascript`.
/// Listing uses JavaScript for Automation, mutations use AppleScript.
#[derive(Debug, Clone, Default)]
pub struct ChromeDirectory {
    settings: BrowserSettings,
}

impl ChromeDirectory {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn list_script(&self) -> Result<String, DirectoryError> {
        let app = serde_json::to_string(&self.settings.application)
            .map_err(|err| DirectoryError::Parse(err.to_string()))?;
        Ok(format!(
            r#"
const browser = Application({app});
const out = [];
const windows = browser.windows();
for (let i = 0; i < windows.length; i++) {{
    const win = windows[i];
    const tabs = win.tabs();
    for (let j = 0; j < tabs.length; j++) {{
        out.push({{
            title: tabs[j].title(),
            url: tabs[j].url(),
            windowIndex: i + 1,
            tabIndex: j + 1,
            windowId: win.id()
        }});
    }}
}}
JSON.stringify(out);
"#
        ))
    }

    fn tell(&self, body: &str) -> String {
        format!(
            "tell application {}\n{body}\nend tell",
            applescript_string(&self.settings.application)
        )
    }

    async fn osascript(&self, args: &[&str]) -> Result<String, DirectoryError> {
        engine_trace!("osascript {:?}", args);
        let mut command = Command::new("osascript");
        command.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(self.settings.script_timeout, command.output())
            .await
            .map_err(|_| DirectoryError::Timeout(self.settings.script_timeout))?
            .map_err(|err| DirectoryError::Unavailable(format!("cannot run osascript: {err}")))?;
        self.check_output(output)
    }

    fn check_output(&self, output: Output) -> Result<String, DirectoryError> {
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains("isn't running") || stderr.contains("-1743") {
            Err(DirectoryError::Unavailable(format!(
                "{stderr}. Make sure {} is running and that this terminal may control it \
                 (System Settings > Privacy & Security > Automation)",
                self.settings.application
            )))
        } else {
            Err(DirectoryError::ScriptFailed(stderr))
        }
    }

    async fn applescript(&self, body: &str) -> Result<String, DirectoryError> {
        let script = self.tell(body);
        self.osascript(&["-e", &script]).await
    }
}

#[async_trait::async_trait]
impl TabDirectory for ChromeDirectory {
    async fn list(&self) -> Result<Vec<TabRef>, DirectoryError> {
        let script = self.list_script()?;
        let stdout = self.osascript(&["-l", "JavaScript", "-e", &script]).await?;
        let tabs = parse_tab_listing(&stdout)?;
        engine_debug!("Browser reports {} tabs", tabs.len());
        Ok(tabs)
    }

    async fn create_window(&self) -> Result<WindowId, DirectoryError> {
        let stdout = self
            .applescript("set newWindow to make new window\nreturn id of newWindow")
            .await?;
        parse_window_id(&stdout)
    }

    async fn move_tab(
        &self,
        window_position: u32,
        tab_position: u32,
        to: WindowId,
    ) -> Result<(), DirectoryError> {
        self.applescript(&format!(
            "move tab {tab_position} of window {window_position} to end of tabs of window id {to}"
        ))
        .await
        .map(|_| ())
    }

    async fn close_tab(&self, window_position: u32, tab_position: u32) -> Result<(), DirectoryError> {
        self.applescript(&format!("close tab {tab_position} of window {window_position}"))
            .await
            .map(|_| ())
    }

    async fn window_id_at(&self, window_position: u32) -> Result<WindowId, DirectoryError> {
        let stdout = self
            .applescript(&format!("return id of window {window_position}"))
            .await
            .map_err(|err| match err {
                DirectoryError::ScriptFailed(_) => {
                    DirectoryError::UnknownWindow(format!("position {window_position}"))
                }
                other => other,
            })?;
        parse_window_id(&stdout)
    }
}

fn parse_tab_listing(stdout: &str) -> Result<Vec<TabRef>, DirectoryError> {
    let tabs: Vec<ScriptTab> =
        serde_json::from_str(stdout).map_err(|err| DirectoryError::Parse(err.to_string()))?;
    Ok(tabs
        .into_iter()
        .map(|tab| {
            TabRef::new(tab.title, tab.url, tab.window_index, tab.tab_index)
                .with_window_id(WindowId(tab.window_id))
        })
        .collect())
}

fn parse_window_id(stdout: &str) -> Result<WindowId, DirectoryError> {
    stdout
        .trim()
        .parse::<u64>()
        .map(WindowId)
        .map_err(|err| DirectoryError::Parse(format!("window id {stdout:?}: {err}")))
}

/// Double-quoted AppleScript string literal.
fn applescript_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
