use crate::prelude::*;

/// Asks the user to type `yes` in the terminal. Anything else, including
/// the end of input, is treated as a refusal.
pub(crate) async fn read_confirmation(message: &str, auto_confirm: bool) -> Result {
    if auto_confirm {
        return Ok(());
    }

    warn!("{message} Type `yes` to confirm");

    // Reading stdin blocks the thread, so it's done outside of the runtime workers
    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await
    .context("Failed to spawn blocking task for user input")?
    .context("Failed to read confirmation from `stdin`")?;

    ensure!(answer.trim() == "yes", "Confirmation response was not `yes`");

    Ok(())
}
