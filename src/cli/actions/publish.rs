use crate::cli::actions::Action;
use crate::wink::publish::{self, HostPaths, PublishRegistry};
use anyhow::{anyhow, Result};
use tracing::info;

/// Handle the publish action
pub fn handle(action: Action) -> Result<()> {
    if let Action::Publish {
        tag,
        public_dir,
        config_dir,
        force,
    } = action
    {
        let mut registry = PublishRegistry::new();
        publish::register_publishing(
            &mut registry,
            true,
            &HostPaths {
                public_dir,
                config_dir,
            },
        );

        let tags: Vec<String> = match tag {
            Some(tag) => {
                if registry.group(&tag).is_none() {
                    return Err(anyhow!("unknown publish tag: {tag}"));
                }
                vec![tag]
            }
            None => registry.tags().map(ToString::to_string).collect(),
        };

        for tag in tags {
            let copied = publish::publish(&registry, &tag, force)?;
            info!("Published {copied} file(s) for tag {tag}");
        }
    }

    Ok(())
}
