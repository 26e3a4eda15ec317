use crate::db::Storage;
use crate::models::Transaction;
use crate::services::LedgerStore;
use crate::utils::Table;

use super::describe;

/// `$history <wallet> [page]`, page may be written `2` or `p2`.
/// The footer points at the neighbouring pages when there are any.
pub async fn history<S: Storage>(
    ledger: &LedgerStore<S>,
    args: &[&str],
    page_size: usize,
) -> Result<String, String> {
    let Some(wallet_id) = args.first() else {
        return Ok("Usage: $history <wallet id> [page]".to_string());
    };

    let page_num = match args.get(1) {
        Some(raw) => {
            let lowered = raw.to_lowercase();
            let digits = lowered.strip_prefix('p').unwrap_or(&lowered);
            digits
                .parse::<usize>()
                .map_err(|_| format!("Invalid page number: {}", raw))?
        }
        None => 1,
    };

    let page = ledger
        .history_page(wallet_id, page_num, page_size)
        .await
        .map_err(|e| describe(&e))?;

    if page.total_pages == 0 {
        return Ok(format!("No transactions found for {}", wallet_id));
    }
    if page.items.is_empty() {
        return Err(format!(
            "Invalid page number. This history has {} page(s)",
            page.total_pages
        ));
    }

    let mut table = Table::new(&["#", "Date", "Type", "From", "To", "Amount"]);
    for tx in &page.items {
        table.add_row(history_row(tx, wallet_id));
    }

    let mut footer = format!("Page {}/{}", page.current_page, page.total_pages);
    if !page.is_first() {
        footer.push_str(&format!(" | Prev: $history {} p{}", wallet_id, page.current_page - 1));
    }
    if !page.is_last() {
        footer.push_str(&format!(" | Next: $history {} p{}", wallet_id, page.current_page + 1));
    }

    Ok(format!("{}\n{}", table.render(), footer))
}

fn history_row(tx: &Transaction, viewer: &str) -> Vec<String> {
    let label = |id: &str| {
        if id == viewer {
            "you".to_string()
        } else {
            short_id(id)
        }
    };

    vec![
        tx.seq.to_string(),
        tx.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        tx.kind.to_string(),
        tx.sender.as_deref().map(label).unwrap_or_else(|| "-".to_string()),
        label(&tx.recipient),
        tx.amount.to_string(),
    ]
}

fn short_id(id: &str) -> String {
    match id.char_indices().nth(8) {
        Some((cut, _)) => format!("{}…", &id[..cut]),
        None => id.to_string(),
    }
}

/// `$tx <uuid>`: full receipt as JSON
pub async fn detail<S: Storage>(ledger: &LedgerStore<S>, args: &[&str]) -> Result<String, String> {
    let Some(uuid) = args.first() else {
        return Ok("Usage: $tx <receipt uuid>".to_string());
    };

    let transaction = ledger
        .get_transaction(uuid)
        .await
        .map_err(|e| describe(&e))?
        .ok_or_else(|| format!("Transaction {} not found", uuid))?;

    serde_json::to_string_pretty(&transaction).map_err(|e| e.to_string())
}
