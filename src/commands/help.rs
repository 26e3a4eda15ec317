pub fn text() -> String {
    [
        "Wallet ledger commands",
        "",
        "Wallets",
        "  $create                          Create a wallet with zero balance",
        "  $wallets                         List wallet IDs",
        "  $balance <wallet>                Show a wallet balance",
        "",
        "Funds",
        "  $deposit <wallet> <amount>       Add funds to a wallet",
        "  $send <from> <to> <amount>       Transfer between wallets",
        "",
        "History",
        "  $history <wallet> [page]         List transactions, oldest first",
        "  $tx <receipt uuid>               Show one transaction",
        "",
        "  $help                            Show this message",
        "  $quit                            Exit",
    ]
    .join("\n")
}
