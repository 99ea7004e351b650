use anyhow::Result;
use panelo::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    match action {
        Action::Dashboard { .. } => actions::dashboard::handle(action).await?,
    }

    Ok(())
}
