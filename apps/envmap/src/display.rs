//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::Style;
use envmap_ops::{AssetListing, InstallReport, ModuleStatus, OperationResult, StreamReport};
use envmap_types::ColorChoice;
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        let colors_enabled = match color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
        };
        Self {
            json_output,
            colors_enabled,
        }
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors_enabled
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::AssetList(listing) => self.render_asset_list(listing),
            OperationResult::Status(status) => self.render_status(status),
            OperationResult::Install(report) => self.render_install(report),
            OperationResult::Stream(report) => self.render_stream(report),
            OperationResult::Success(message) => {
                println!("{}", self.bold(message));
            }
        }
        Ok(())
    }

    fn render_asset_list(&self, listing: &AssetListing) {
        println!(
            "{} {} from {}",
            self.bold(&listing.assets.len().to_string()),
            if listing.assets.len() == 1 { "asset" } else { "assets" },
            listing.provenance
        );
        for uri in &listing.assets {
            println!("  {uri}");
        }
    }

    fn render_status(&self, status: &ModuleStatus) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let rows = [
            ("Module", status.module.clone()),
            ("State", status.state.to_string()),
            ("Installed", yes_no(status.installed).to_string()),
            ("Remote enabled", yes_no(status.remote_enabled).to_string()),
            ("Bundle", status.bundle_dir.display().to_string()),
            ("Catalog", status.catalog_dir.display().to_string()),
            ("Modules", status.modules_dir.display().to_string()),
            ("Active streams", status.active_streams.to_string()),
        ];
        for (field, value) in rows {
            table.add_row(vec![Cell::new(field), Cell::new(value)]);
        }
        println!("{table}");
    }

    fn render_install(&self, report: &InstallReport) {
        if report.already_installed {
            println!("Module {} already installed", self.bold(&report.module));
        } else {
            println!("Module {} {}", self.bold(&report.module), report.state);
        }
    }

    fn render_stream(&self, report: &StreamReport) {
        let destination = report
            .destination
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        println!(
            "Wrote {} bytes of {} ({}) to {destination}",
            report.bytes, report.uri, report.content_type
        );
    }

    fn bold(&self, text: &str) -> String {
        if self.colors_enabled {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
