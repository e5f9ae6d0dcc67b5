use super::{no_usages, Options, Project};
use crate::output::{display_path, print_json};
use actpin_core::pin::{self, Issue};
use actpin_core::resolver::TagResolver;

pub fn run(opts: &Options<'_>) -> anyhow::Result<()> {
    let Some(project) = Project::load(opts)? else {
        return no_usages(opts, &Vec::<Issue>::new());
    };
    let client = project.client(opts)?;
    let mut resolver = TagResolver::new(&client);

    let issues = pin::verify(&mut resolver, &project.files, &project.config);

    if opts.json {
        print_json(&issues)?;
    } else if issues.is_empty() {
        println!("All workflows and composite actions are pinned to matching commit SHAs.");
    } else {
        for issue in &issues {
            println!(
                "{}:{} {}",
                display_path(opts.root, &issue.path),
                issue.line,
                issue.message
            );
        }
    }

    if !issues.is_empty() {
        anyhow::bail!("{} action reference(s) failed verification", issues.len());
    }
    Ok(())
}
