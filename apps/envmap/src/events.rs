//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{Style, Term};
use envmap_events::{AppEvent, EventMessage, GeneralEvent, InstallEvent, ResolverEvent, StreamEvent};

/// Renders user-facing progress on stderr and forwards every event to tracing
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// Suppress all terminal output (JSON mode)
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::Install(event) => self.handle_install(event),
            AppEvent::Resolver(event) => self.handle_resolver(event),
            AppEvent::Stream(StreamEvent::Failed { uri, failure }) => {
                self.show_error(&format!("Stream of {uri} failed: {}", failure.message));
            }
            AppEvent::Stream(_) => {}
            AppEvent::General(event) => self.handle_general(event),
        }
    }

    fn handle_install(&mut self, event: InstallEvent) {
        match event {
            InstallEvent::Requested { module } => {
                self.show_status(&format!("Installing module {module}"));
            }
            InstallEvent::Progress {
                module, percent, ..
            } => {
                let line = format!("Downloading {module}: {percent:>3}%");
                let _ = self.term.clear_line();
                let _ = self.term.write_str(&line);
                if percent == 100 {
                    let _ = self.term.write_line("");
                }
            }
            InstallEvent::Completed { module } => {
                self.show_success(&format!("Module {module} installed"));
            }
            InstallEvent::Failed { module, failure } => {
                let _ = self.term.clear_line();
                self.show_warning(&format!("Module {module} unavailable: {}", failure.message));
                if let Some(hint) = failure.hint {
                    self.show_status(&format!("  Hint: {hint}"));
                }
            }
            InstallEvent::Canceled { module } => {
                self.show_warning(&format!("Install of {module} canceled"));
            }
            InstallEvent::Attached { .. } | InstallEvent::Detached { .. } => {}
        }
    }

    fn handle_resolver(&mut self, event: ResolverEvent) {
        match event {
            ResolverEvent::StrategySkipped { strategy, reason } if self.debug_enabled => {
                self.show_status(&format!("Skipped {strategy}: {reason}"));
            }
            ResolverEvent::FellBack { uri, .. } => {
                self.show_warning(&format!("No assets found, using {uri}"));
            }
            _ => {}
        }
    }

    fn handle_general(&mut self, event: GeneralEvent) {
        if !self.debug_enabled {
            return;
        }
        match event {
            GeneralEvent::OperationStarted { operation } => {
                self.show_status(&format!("Running {operation}"));
            }
            GeneralEvent::OperationFailed { operation, error } => {
                self.show_status(&format!("{operation} failed: {error}"));
            }
            GeneralEvent::OperationCompleted { .. } => {}
        }
    }

    fn styled(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn show_status(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn show_success(&self, text: &str) {
        let _ = self.term.write_line(&self.styled(Style::new().green(), text));
    }

    fn show_warning(&self, text: &str) {
        let _ = self.term.write_line(&self.styled(Style::new().yellow(), text));
    }

    fn show_error(&self, text: &str) {
        let _ = self.term.write_line(&self.styled(Style::new().red().bold(), text));
    }
}
