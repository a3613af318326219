//! `dicprov list` – catalog entries and their local status.

use crate::cli::context::AppContext;
use anyhow::Result;
use dicprov_core::catalog::DictionaryKind;
use dicprov_core::store::LocalStore;

pub async fn run_list(ctx: &AppContext) -> Result<()> {
    let catalog = ctx.provisioner.catalog();
    if catalog.is_empty() {
        println!("No dictionaries in catalog.");
        return Ok(());
    }
    println!("{:<8} {:<9} {:<8} {}", "LANG", "KIND", "STATUS", "FILE");
    for d in catalog.iter() {
        let (kind, stored) = match d.kind() {
            DictionaryKind::Builtin => (
                "builtin",
                d.asset_names().iter().all(|n| ctx.store.exists(n)),
            ),
            DictionaryKind::External => ("external", ctx.store.exists(&d.stored_file_name)),
        };
        let files = match d.kind() {
            DictionaryKind::Builtin => d.asset_names().join(","),
            DictionaryKind::External => d.stored_file_name.clone(),
        };
        println!(
            "{:<8} {:<9} {:<8} {}",
            d.language_id,
            kind,
            if stored { "stored" } else { "missing" },
            files
        );
    }
    Ok(())
}
