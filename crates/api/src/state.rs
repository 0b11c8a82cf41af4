/// Shared handler state. Cloning only bumps the pool's reference count.
#[derive(Clone)]
pub struct AppState {
    pub pool: datagen_db::DbPool,
}
