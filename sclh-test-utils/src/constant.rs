//! Standard values shared across tests.

/// User agent sent by gateways built for tests.
pub static TEST_USER_AGENT: &str = "sclh-test/1.0 (+https://github.com/kat1248/sclh)";

pub const TEST_CHARACTER_NAME: &str = "Kat Tester";
pub const TEST_CHARACTER_ID: i64 = 123;
pub const TEST_CORPORATION_ID: i64 = 98_000_456;
pub const TEST_CORPORATION_NAME: &str = "Space Monkey Alliance Holding";
pub const TEST_NPC_CORPORATION_ID: i64 = 456;
pub const TEST_ALLIANCE_ID: i64 = 99_000_789;
pub const TEST_ALLIANCE_NAME: &str = "Test Alliance Please Ignore";
pub const TEST_BIRTHDAY: &str = "2000-01-01T00:00:00Z";

/// Hash of every killmail created by the fixtures unless given explicitly.
pub const TEST_KILLMAIL_HASH: &str = "abc123";
