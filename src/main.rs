use std::path::Path;

use anyhow::{Context, Result};

use stockflow::io::load_transactions;
use stockflow::types::MemoryLedger;
use stockflow::ui::{report_banner, run_ui, App};

fn main() -> Result<()> {
    let mut app = App::new(MemoryLedger::new());

    // An optional positional argument pre-loads a stock file into the fresh
    // session before the dashboard opens
    if let Some(path) = std::env::args().nth(1) {
        let report = load_transactions(Path::new(&path), &mut app.ledger)
            .with_context(|| format!("Couldn't import stock file {path}"))?;
        app.banner = Some(report_banner(&report));
    }

    run_ui(&mut app)?;

    Ok(())
}
