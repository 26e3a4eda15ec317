use rust_decimal::Decimal;
use sqlx::mysql::MySqlConnection;

/// Insert a zero-balance wallet. Returns false when the ID already exists.
pub async fn insert_wallet(
    conn: &mut MySqlConnection,
    wallet_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT IGNORE INTO wallet (wallet_id, balance) VALUES (?, 0)")
        .bind(wallet_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Get wallet balance by wallet ID
pub async fn get_balance(
    conn: &mut MySqlConnection,
    wallet_id: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>("SELECT balance FROM wallet WHERE wallet_id = ?")
        .bind(wallet_id)
        .fetch_optional(conn)
        .await
}

/// Read a balance and hold the row lock until the surrounding transaction ends
pub async fn lock_balance(
    conn: &mut MySqlConnection,
    wallet_id: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>("SELECT balance FROM wallet WHERE wallet_id = ? FOR UPDATE")
        .bind(wallet_id)
        .fetch_optional(conn)
        .await
}

/// Add `delta` (possibly negative) to a wallet balance
pub async fn update_balance(
    conn: &mut MySqlConnection,
    wallet_id: &str,
    delta: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE wallet SET balance = balance + ? WHERE wallet_id = ?")
        .bind(delta)
        .bind(wallet_id)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn list_wallet_ids(conn: &mut MySqlConnection) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT wallet_id FROM wallet ORDER BY wallet_id")
        .fetch_all(conn)
        .await
}

pub async fn total_balance(conn: &mut MySqlConnection) -> Result<Decimal, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>("SELECT CAST(COALESCE(SUM(balance), 0) AS DECIMAL(38, 8)) FROM wallet")
        .fetch_one(conn)
        .await
}
