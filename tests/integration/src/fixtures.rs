//! Seed data
//!
//! alice and bob are mutual buddies; carol only added alice (one-way);
//! dave and alice are buddies but dave blocked alice.

use buddylink_core::entities::User;
use buddylink_core::Snowflake;
use buddylink_db::MemoryStore;

pub const ALICE: Snowflake = Snowflake::new(1001);
pub const BOB: Snowflake = Snowflake::new(1002);
pub const CAROL: Snowflake = Snowflake::new(1003);
pub const DAVE: Snowflake = Snowflake::new(1004);

pub struct Fixtures {
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub dave: User,
}

impl Fixtures {
    pub fn seed(store: &MemoryStore) -> Self {
        let fixtures = Self {
            alice: store.add_user(ALICE, "alice"),
            bob: store.add_user(BOB, "bob"),
            carol: store.add_user(CAROL, "carol"),
            dave: store.add_user(DAVE, "dave"),
        };

        store.make_buddies(ALICE, BOB);
        store.add_buddy_edge(CAROL, ALICE);
        store.make_buddies(ALICE, DAVE);
        store.block(DAVE, ALICE);

        fixtures
    }
}
