//! `dicprov path <lang>` – print where a stored dictionary lives.

use crate::cli::context::AppContext;
use anyhow::Result;
use dicprov_core::catalog::DictionaryKind;
use dicprov_core::store::LocalStore;

/// Never starts a download or materializes anything.
pub async fn run_path(ctx: &AppContext, lang: &str) -> Result<()> {
    let Some(descriptor) = ctx.provisioner.catalog().resolve(lang) else {
        anyhow::bail!("no dictionary for language {lang}");
    };
    let present = match descriptor.kind() {
        DictionaryKind::Builtin => descriptor.asset_names().iter().all(|n| ctx.store.exists(n)),
        DictionaryKind::External => ctx.store.exists(&descriptor.stored_file_name),
    };
    if !present {
        anyhow::bail!("dictionary for {lang} is not stored yet; run `dicprov fetch {lang}`");
    }
    let path = match descriptor.kind() {
        DictionaryKind::Builtin => ctx.store.root(),
        DictionaryKind::External => ctx.store.absolute_path(&descriptor.stored_file_name),
    };
    println!("{}", path.display());
    Ok(())
}
