use crate::db::Storage;
use crate::services::LedgerStore;
use crate::utils::Table;

use super::describe;

pub async fn create<S: Storage>(ledger: &LedgerStore<S>) -> Result<String, String> {
    let wallet_id = ledger.create_wallet().await.map_err(|e| describe(&e))?;
    Ok(format!("Wallet created with ID: {}", wallet_id))
}

pub async fn list<S: Storage>(ledger: &LedgerStore<S>) -> Result<String, String> {
    let ids = ledger.list_wallet_ids().await.map_err(|e| describe(&e))?;

    let mut table = Table::new(&["#", "Wallet"]);
    for (i, id) in ids.into_iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), id]);
    }
    if table.is_empty() {
        return Ok("No wallets yet. Use $create".to_string());
    }
    Ok(table.render())
}
