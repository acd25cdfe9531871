use rand::Rng;

use crate::config::ChannelRoutingTable;

/// Picks the channel to draw a post from for a chat.
#[derive(Debug, Clone)]
pub struct ChannelRouter {
    table: ChannelRoutingTable,
}

impl ChannelRouter {
    pub fn new(table: ChannelRoutingTable) -> Self {
        Self { table }
    }

    pub fn pick(&self, chat_id: i64) -> &str {
        self.pick_with(chat_id, &mut rand::thread_rng())
    }

    /// Uniform choice among the chat's channels. The routing table never
    /// holds an empty list, so this always yields a name.
    pub fn pick_with<R: Rng + ?Sized>(&self, chat_id: i64, rng: &mut R) -> &str {
        let channels = self.table.channels_for(chat_id);
        &channels[rng.gen_range(0..channels.len())]
    }

    pub fn table(&self) -> &ChannelRoutingTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn router() -> ChannelRouter {
        let mut overrides = HashMap::new();
        overrides.insert(42, vec!["earthporn".to_string()]);
        overrides.insert(
            -100,
            vec!["cityporn".to_string(), "architectureporn".to_string()],
        );
        let table = ChannelRoutingTable::new(
            vec!["spaceporn".to_string(), "waterporn".to_string(), "skyporn".to_string()],
            overrides,
        )
        .unwrap();
        ChannelRouter::new(table)
    }

    #[test]
    fn test_override_chats_only_get_their_channels() {
        let router = router();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            assert_eq!(router.pick_with(42, &mut rng), "earthporn");
            let picked = router.pick_with(-100, &mut rng);
            assert!(picked == "cityporn" || picked == "architectureporn");
        }
    }

    #[test]
    fn test_other_chats_get_default_channels() {
        let router = router();
        let mut rng = StdRng::seed_from_u64(11);
        let defaults: HashSet<&str> = ["spaceporn", "waterporn", "skyporn"].into_iter().collect();

        let mut seen = HashSet::new();
        for chat_id in 1000..1300 {
            let picked = router.pick_with(chat_id, &mut rng);
            assert!(defaults.contains(picked), "unexpected channel {}", picked);
            seen.insert(picked.to_string());
        }
        // Every default entry is reachable
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_pick_uses_thread_rng() {
        let router = router();
        assert_eq!(router.pick(42), "earthporn");
        assert_eq!(router.table().override_count(), 2);
    }
}
