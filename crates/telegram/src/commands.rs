use std::sync::Arc;

use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    utils::command::BotCommands,
};
use tracing::{info, warn};

use common::AnnouncementSink;
use engine::{run_and_deliver, Scanner};
use store::SignalBook;

use crate::format;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const HISTORY_SHOWN: usize = 10;

/// Dependencies injected into every handler via `dptree`.
#[derive(Clone)]
pub struct BotDeps {
    pub scanner: Arc<Scanner>,
    pub book: SignalBook,
    /// Receives announcements produced by on-demand cycles.
    pub sink: Arc<dyn AnnouncementSink>,
    pub admin_id: i64,
}

/// Chat commands. Everything below `Grant` is admin-only.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Signal bot commands:")]
pub enum Command {
    #[command(description = "Welcome message")]
    Start,
    #[command(description = "Show this help")]
    Help,
    #[command(description = "Analyze a symbol now, e.g. /scan BTCUSDT")]
    Scan(String),
    #[command(description = "List the scanned symbols")]
    Coins,
    #[command(description = "Get notified when a symbol has a trade idea")]
    Watch(String),
    #[command(description = "Stop watching a symbol")]
    Unwatch(String),
    #[command(description = "Show your watched symbols")]
    Watchlist,
    #[command(description = "Recently announced ideas")]
    History,
    #[command(description = "Scanner status")]
    Status,
    #[command(description = "(admin) Give a user access: /grant USER_ID")]
    Grant(String),
    #[command(description = "(admin) Remove a user's access: /revoke USER_ID")]
    Revoke(String),
    #[command(description = "(admin) List users with access")]
    Users,
    #[command(description = "(admin) Run a scan cycle now")]
    Cycle,
}

/// Start the Telegram bot in long-polling mode.
pub async fn start_bot(bot: Bot, deps: BotDeps) {
    let deps = Arc::new(deps);

    info!("Telegram bot starting (long-polling)");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    use dptree::case;

    let admin_handler = dptree::filter(is_admin)
        .branch(case![Command::Grant(arg)].endpoint(handle_grant))
        .branch(case![Command::Revoke(arg)].endpoint(handle_revoke))
        .branch(case![Command::Users].endpoint(handle_users))
        .branch(case![Command::Cycle].endpoint(handle_cycle));

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(handle_start))
        .branch(case![Command::Help].endpoint(handle_help))
        .branch(case![Command::Scan(arg)].endpoint(handle_scan))
        .branch(case![Command::Coins].endpoint(handle_coins))
        .branch(case![Command::Watch(arg)].endpoint(handle_watch))
        .branch(case![Command::Unwatch(arg)].endpoint(handle_unwatch))
        .branch(case![Command::Watchlist].endpoint(handle_watchlist))
        .branch(case![Command::History].endpoint(handle_history))
        .branch(case![Command::Status].endpoint(handle_status))
        .branch(admin_handler)
        .branch(dptree::endpoint(handle_admin_only));

    Update::filter_message()
        .filter_map(|msg: Message| msg.from().map(|u| u.id))
        .filter_async(auth_filter)
        .branch(command_handler)
}

fn is_admin(user_id: UserId, deps: Arc<BotDeps>) -> bool {
    user_id.0 as i64 == deps.admin_id
}

/// Only the admin and granted users are served; everyone else is dropped.
async fn auth_filter(user_id: UserId, deps: Arc<BotDeps>) -> bool {
    let uid = user_id.0 as i64;
    if uid == deps.admin_id {
        return true;
    }
    let allowed = deps.book.is_granted(uid).await.unwrap_or_else(|e| {
        warn!(user_id = uid, error = %e, "Permission lookup failed");
        false
    });
    if !allowed {
        warn!(user_id = uid, "Unauthorized Telegram access attempt");
    }
    allowed
}

fn parse_user_id(arg: &str) -> Option<i64> {
    arg.trim().parse().ok()
}

// ─── Everyone ────────────────────────────────────────────────────────────────

async fn handle_start(bot: Bot, msg: Message) -> HandlerResult {
    let text = format!(
        "Hi! I scan the market and send trade ideas when enough signals line up.\n\n{}",
        Command::descriptions()
    );
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
    Ok(())
}

async fn handle_scan(bot: Bot, msg: Message, deps: Arc<BotDeps>, arg: String) -> HandlerResult {
    let Some(symbol) = format::normalize_symbol(&arg) else {
        bot.send_message(msg.chat.id, "Usage: /scan SYMBOL, e.g. /scan BTCUSDT").await?;
        return Ok(());
    };
    let analysis = deps.scanner.scan(&symbol).await;
    bot.send_message(msg.chat.id, format::analysis(&analysis)).await?;
    Ok(())
}

async fn handle_coins(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let text = format!("Scanning: {}", deps.scanner.symbols().join(", "));
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_watch(
    bot: Bot,
    msg: Message,
    deps: Arc<BotDeps>,
    user_id: UserId,
    arg: String,
) -> HandlerResult {
    let Some(symbol) = format::normalize_symbol(&arg) else {
        bot.send_message(msg.chat.id, "Usage: /watch SYMBOL").await?;
        return Ok(());
    };
    let text = if deps.book.watch(user_id.0 as i64, &symbol).await? {
        format!("Watching {symbol}. You'll get a message whenever it has a trade idea.")
    } else {
        format!("You're already watching {symbol}.")
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_unwatch(
    bot: Bot,
    msg: Message,
    deps: Arc<BotDeps>,
    user_id: UserId,
    arg: String,
) -> HandlerResult {
    let Some(symbol) = format::normalize_symbol(&arg) else {
        bot.send_message(msg.chat.id, "Usage: /unwatch SYMBOL").await?;
        return Ok(());
    };
    let text = if deps.book.unwatch(user_id.0 as i64, &symbol).await? {
        format!("Stopped watching {symbol}.")
    } else {
        format!("{symbol} is not on your watchlist.")
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_watchlist(
    bot: Bot,
    msg: Message,
    deps: Arc<BotDeps>,
    user_id: UserId,
) -> HandlerResult {
    let list = deps.book.watchlist(user_id.0 as i64).await?;
    let text = if list.is_empty() {
        "Your watchlist is empty.".to_string()
    } else {
        format!("Watching: {}", list.join(", "))
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_history(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let records = deps.book.history(HISTORY_SHOWN).await?;
    bot.send_message(msg.chat.id, format::history(&records)).await?;
    Ok(())
}

async fn handle_status(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let status = deps.scanner.status().read().await.clone();
    let recipients = 1 + deps
        .book
        .granted()
        .await?
        .iter()
        .filter(|&&id| id != deps.admin_id)
        .count();
    let text = format::status(&status, deps.scanner.symbols().len(), recipients);
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

// ─── Admin ───────────────────────────────────────────────────────────────────

async fn handle_grant(bot: Bot, msg: Message, deps: Arc<BotDeps>, arg: String) -> HandlerResult {
    let Some(id) = parse_user_id(&arg) else {
        bot.send_message(msg.chat.id, "Usage: /grant USER_ID").await?;
        return Ok(());
    };
    let text = if id == deps.admin_id {
        "The admin always has access.".to_string()
    } else if deps.book.grant(id).await? {
        info!(user_id = id, "Access granted");
        format!("Access granted to {id}.")
    } else {
        format!("{id} already has access.")
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_revoke(bot: Bot, msg: Message, deps: Arc<BotDeps>, arg: String) -> HandlerResult {
    let Some(id) = parse_user_id(&arg) else {
        bot.send_message(msg.chat.id, "Usage: /revoke USER_ID").await?;
        return Ok(());
    };
    let text = if deps.book.revoke(id).await? {
        info!(user_id = id, "Access revoked");
        format!("Access revoked for {id}.")
    } else {
        format!("{id} had no access.")
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_users(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let granted = deps.book.granted().await?;
    let text = if granted.is_empty() {
        "No users besides the admin.".to_string()
    } else {
        let ids: Vec<String> = granted.iter().map(|id| id.to_string()).collect();
        format!("Users with access: {}", ids.join(", "))
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_cycle(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    bot.send_message(msg.chat.id, "Running a scan cycle\u{2026}").await?;
    let text = if run_and_deliver(&deps.scanner, deps.sink.as_ref()).await {
        let sent = deps.scanner.status().read().await.last_announcements;
        format!("Cycle finished with {sent} announcements.")
    } else {
        "A cycle is already running, try again shortly.".to_string()
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_admin_only(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "That command is for the admin only.").await?;
    Ok(())
}
