//! Operator commands typed at the server's stdin.
//!
//! Commands are posted to the task queue and run on the simulation thread
//! between ticks.

use mc_sync_proto::packets::{Chat, ClientboundPacket};
use mc_sync_proto::types::BlockPos;

use crate::context::ServerContext;

const HELP: &str = "Commands: list, say <message>, time, sleep <conn>, wake <conn>, \
setblock <x> <y> <z> <state> [delay], stop, help";

/// Run one console line against the context and return the reply.
pub fn execute(ctx: &mut ServerContext, line: &str) -> String {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return String::new();
    };
    match command {
        "list" => {
            let conns = ctx.connections();
            let names: Vec<String> = conns.iter().map(|c| format!("#{c}")).collect();
            format!("{} player(s) online: {}", conns.len(), names.join(", "))
        }
        "say" => {
            let message = line.trim_start()[command.len()..].trim();
            if message.is_empty() {
                return "Usage: say <message>".into();
            }
            let text = format!("[Server] {message}");
            ctx.broadcast(&ClientboundPacket::Chat(Chat::system(&text)));
            text
        }
        "time" => {
            let (dimensions, _) = ctx.split();
            dimensions
                .iter()
                .map(|d| {
                    let (age, time) = d.time();
                    format!("{}: age {age}, time {time}", d.name())
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        "sleep" | "wake" => {
            let Some(conn) = parts.next().and_then(|c| c.parse().ok()) else {
                return format!("Usage: {command} <conn>");
            };
            let Some(dim) = ctx.player_dimension(conn) else {
                return format!("No player #{conn}");
            };
            let sleeping = command == "sleep";
            match ctx.dimension_mut(dim).map(|d| d.set_sleeping(conn, sleeping)) {
                Some(true) => format!("Player #{conn} {command}s"),
                _ => format!("No player #{conn}"),
            }
        }
        "setblock" => {
            let args: Vec<&str> = parts.collect();
            let numbers: Option<Vec<i32>> = args.iter().take(4).map(|p| p.parse().ok()).collect();
            let delay = args.get(4).map_or(Some(1), |d| d.parse::<u64>().ok());
            let (Some([x, y, z, state]), Some(delay)) = (
                numbers.and_then(|n| <[i32; 4]>::try_from(n).ok()),
                delay,
            ) else {
                return "Usage: setblock <x> <y> <z> <state> [delay]".into();
            };
            let pos = BlockPos::new(x, y, z);
            let delay = delay.max(1);
            let (dimensions, _) = ctx.split();
            match dimensions.first_mut().map(|d| d.schedule_block(pos, state, delay)) {
                Some(true) => {
                    format!("Scheduled block {state} at {pos:?} in {delay} tick(s)")
                }
                _ => "No dimension accepts block updates".into(),
            }
        }
        "help" => HELP.into(),
        other => format!("Unknown command '{other}'. {HELP}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkEvent;
    use crate::world::{EntityIds, FlatWorld};

    fn context() -> ServerContext {
        let ids = EntityIds::default();
        let mut ctx = ServerContext::new(ids.clone());
        ctx.add_dimension(Box::new(FlatWorld::new(0, "world", BlockPos::new(0, 4, 0), 1, 0, ids)));
        ctx.handle_event(NetworkEvent::Connected(4));
        ctx.outbox.take();
        ctx
    }

    #[test]
    fn list_and_say() {
        let mut ctx = context();
        assert_eq!(execute(&mut ctx, "list"), "1 player(s) online: #4");
        assert_eq!(execute(&mut ctx, "say  hello there"), "[Server] hello there");
        let sent = ctx.outbox.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].packet,
            ClientboundPacket::Chat(Chat::system("[Server] hello there"))
        );
    }

    #[test]
    fn sleep_and_setblock() {
        let mut ctx = context();
        assert_eq!(execute(&mut ctx, "sleep 4"), "Player #4 sleeps");
        assert!(ctx.all_idle());
        assert_eq!(execute(&mut ctx, "sleep 9"), "No player #9");
        assert!(execute(&mut ctx, "setblock 1 4 1 16").starts_with("Scheduled block 16"));
        assert!(execute(&mut ctx, "setblock 1 4").starts_with("Usage"));
    }

    #[test]
    fn setblock_rejects_out_of_range_numbers() {
        let mut ctx = context();
        // 2^32 + 1 must not wrap around to x = 1.
        assert!(execute(&mut ctx, "setblock 4294967297 4 1 16").starts_with("Usage"));
        assert!(execute(&mut ctx, "setblock 1 4 1 2147483648").starts_with("Usage"));
        assert!(execute(&mut ctx, "setblock 1 4 1 16 -3").starts_with("Usage"));
        assert_eq!(
            execute(&mut ctx, "setblock -2147483648 4 1 16 0"),
            "Scheduled block 16 at BlockPos { x: -2147483648, y: 4, z: 1 } in 1 tick(s)"
        );
    }

    #[test]
    fn unknown_command_shows_help() {
        let mut ctx = context();
        assert!(execute(&mut ctx, "fly").contains("Commands:"));
        assert_eq!(execute(&mut ctx, "   "), "");
    }
}
