use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use forgedeck::app::Workbench;
use forgedeck::kernel::services::adapters::{
    ensure_settings_file, ensure_state_dir, load_settings, BackendConnection, FileStorage,
    TcpLineTransport, WorkspacePersistence,
};
use forgedeck::kernel::services::ports::{Settings, StateStorage};
use forgedeck::kernel::services::{FileOpenChannel, FileOpenRequest};
use forgedeck::kernel::{Action, ServiceRegistry, Store, Tab, WorkspaceId};

mod logging;

const USAGE: &str = "usage: forgedeck [show | toggle <service> | drop <service> <workspace> | \
activate <workspace> <tab> | close <workspace> <tab> | open-file <workspace> <path> | watch]";

const WATCH_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliCommand {
    Show,
    Toggle(String),
    Drop {
        service: String,
        workspace: WorkspaceId,
    },
    Activate {
        workspace: WorkspaceId,
        tab: String,
    },
    Close {
        workspace: WorkspaceId,
        tab: String,
    },
    OpenFile {
        workspace: WorkspaceId,
        path: PathBuf,
    },
    Watch,
}

fn parse_workspace(value: &str) -> Result<WorkspaceId, String> {
    WorkspaceId::parse(value).ok_or_else(|| format!("unknown workspace: {value}"))
}

fn parse_args(args: &[String]) -> Result<CliCommand, String> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] | ["show"] => Ok(CliCommand::Show),
        ["toggle", service] => Ok(CliCommand::Toggle(service.to_string())),
        ["drop", service, workspace] => Ok(CliCommand::Drop {
            service: service.to_string(),
            workspace: parse_workspace(workspace)?,
        }),
        ["activate", workspace, tab] => Ok(CliCommand::Activate {
            workspace: parse_workspace(workspace)?,
            tab: tab.to_string(),
        }),
        ["close", workspace, tab] => Ok(CliCommand::Close {
            workspace: parse_workspace(workspace)?,
            tab: tab.to_string(),
        }),
        ["open-file", workspace, path] => Ok(CliCommand::OpenFile {
            workspace: parse_workspace(workspace)?,
            path: PathBuf::from(path),
        }),
        ["watch"] => Ok(CliCommand::Watch),
        [other, ..] => Err(format!("unrecognized command: {other}")),
    }
}

fn language_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("rs") => "rust",
        Some("js") | Some("jsx") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        Some("py") => "python",
        Some("sol") => "solidity",
        Some("json") => "json",
        Some("md") => "markdown",
        _ => "plaintext",
    }
}

fn file_open_request(workspace: WorkspaceId, path: &Path) -> std::io::Result<FileOpenRequest> {
    let content = std::fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let tab = Tab::file_editor(
        format!("file-{}", path.display()),
        &file_name,
        language_for_path(path),
        &content,
    );
    Ok(FileOpenRequest::new(workspace, tab))
}

fn render<S: StateStorage>(workbench: &Workbench<S>) -> String {
    let mut out = String::new();
    let launcher: Vec<String> = workbench
        .launcher()
        .into_iter()
        .map(|entry| {
            let marker = if entry.open { "+" } else { " " };
            format!("{marker}{} {}", entry.icon, entry.service_id)
        })
        .collect();
    out.push_str(&format!("services: {}\n", launcher.join("  ")));

    for workspace in WorkspaceId::ALL {
        let tabs: Vec<String> = workbench
            .tab_bar(workspace)
            .into_iter()
            .map(|entry| {
                let marker = if entry.active { "*" } else { "" };
                format!("{marker}{} ({})", entry.title, entry.tab_id)
            })
            .collect();
        out.push_str(&format!("{workspace}: {}\n", tabs.join(" | ")));
    }
    out
}

/// Streams backend process updates until the connection gives up.
fn watch<S: StateStorage>(workbench: Workbench<S>, settings: &Settings) -> ExitCode {
    let (tx, rx) = mpsc::channel();
    let mut connection = match BackendConnection::new(
        settings.backend.url.clone(),
        settings.backend.reconnect_policy(),
        Arc::new(TcpLineTransport),
        tx,
    ) {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("cannot start backend connection: {e}");
            return ExitCode::from(1);
        }
    };
    let mut workbench = workbench.with_backend_events(rx);
    connection.connect();

    let mut printed = 0;
    loop {
        workbench.pump();
        let entries = workbench.process_log().entries();
        for update in &entries[printed..] {
            match &update.path {
                Some(path) => println!("[{}] {} ({path})", update.kind, update.message),
                None => println!("[{}] {}", update.kind, update.message),
            }
        }
        printed = entries.len();

        if workbench.backend_gave_up() {
            eprintln!("backend unreachable: {}", settings.backend.url);
            return ExitCode::from(1);
        }
        std::thread::sleep(WATCH_POLL);
    }
}

fn state_dir(settings: &Settings) -> PathBuf {
    if let Some(dir) = &settings.state_dir {
        return dir.clone();
    }
    ensure_state_dir().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "state dir unavailable, using temp dir");
        std::env::temp_dir().join("forgedeck").join("state")
    })
}

fn main() -> ExitCode {
    let logging = logging::init();
    if let Some(guard) = &logging {
        tracing::debug!(log_dir = %guard.log_dir().display(), "cli start");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = ensure_settings_file() {
        tracing::error!(error = %e, "ensure_settings_file failed");
    }
    let settings = load_settings().unwrap_or_default();

    let registry = ServiceRegistry::builtin();
    let persistence =
        WorkspacePersistence::new(FileStorage::new(state_dir(&settings)), settings.state_key());
    let state = persistence.load(&registry);
    let store = Store::new(state, registry, settings.routing_policy());
    let channel = FileOpenChannel::new();
    let mut workbench = Workbench::new(store, persistence, &channel);

    let changed = match command {
        CliCommand::Show => false,
        CliCommand::Watch => return watch(workbench, &settings),
        CliCommand::Toggle(service) => workbench.handle(Action::toggle(&service)),
        CliCommand::Drop { service, workspace } => {
            workbench.handle(Action::drop_service(&service, workspace))
        }
        CliCommand::Activate { workspace, tab } => {
            workbench.handle(Action::activate(workspace, &tab))
        }
        CliCommand::Close { workspace, tab } => workbench.handle(Action::close(workspace, &tab)),
        CliCommand::OpenFile { workspace, path } => match file_open_request(workspace, &path) {
            Ok(request) => {
                channel.publisher().publish(request);
                workbench.pump() > 0
            }
            Err(e) => {
                eprintln!("cannot open {}: {e}", path.display());
                return ExitCode::from(1);
            }
        },
    };
    tracing::debug!(changed, "command applied");

    print!("{}", render(&workbench));
    ExitCode::SUCCESS
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
