use clap::Subcommand;
use pomobar_core::session::SessionTag;

#[derive(Subcommand)]
pub enum TagAction {
    /// List the available session tags
    List,
}

pub fn run(action: TagAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TagAction::List => {
            for tag in SessionTag::ALL {
                println!("{} {}", tag.emoji(), tag.as_str());
            }
        }
    }
    Ok(())
}
