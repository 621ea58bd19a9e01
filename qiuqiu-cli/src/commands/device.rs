//! Device registry commands.

use anyhow::Result;
use qiuqiu_store::DeviceStore;

/// Print the number of registered devices.
pub async fn count(store: &dyn DeviceStore) -> Result<()> {
    let count = store.count_all().await?;
    println!("{}", count);
    Ok(())
}

/// Bind `token` to `key` and print the effective key.
pub async fn register(store: &dyn DeviceStore, key: &str, token: &str) -> Result<()> {
    let key = store.save_token_by_key(key, token).await?;
    println!("{}", key);
    Ok(())
}

/// Print the token bound to `key`.
pub async fn token(store: &dyn DeviceStore, key: &str) -> Result<()> {
    let token = store.token_by_key(key).await?;
    println!("{}", token);
    Ok(())
}

/// Print the device key registered for `token`.
pub async fn lookup(store: &dyn DeviceStore, token: &str) -> Result<()> {
    let key = store.key_by_token(token).await?;
    println!("{}", key);
    Ok(())
}

/// Remove the binding for `key`.
pub async fn delete(store: &dyn DeviceStore, key: &str) -> Result<()> {
    store.delete_by_key(key).await?;
    println!("Deleted {}", key);
    Ok(())
}
