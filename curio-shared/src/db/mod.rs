/// Database layer
///
/// - `pool`: PostgreSQL connection pool setup
/// - `migrations`: embedded migration runner

pub mod migrations;
pub mod pool;
