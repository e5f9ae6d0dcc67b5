use super::{no_usages, print_summary, Options, Project};
use crate::output::{print_json, short_sha};
use actpin_core::pin::{self, Target, UpgradeReport};
use actpin_core::resolver::TagResolver;

pub fn run(
    opts: &Options<'_>,
    repository: Option<&str>,
    all: bool,
    version: Option<&str>,
) -> anyhow::Result<()> {
    let target = match (repository, all) {
        (None, true) => Target::All,
        (Some(repo), false) => Target::repository(repo)?,
        _ => anyhow::bail!("specify either owner/repo or --all"),
    };

    let Some(mut project) = Project::load(opts)? else {
        return no_usages(opts, &UpgradeReport::default());
    };
    let client = project.client(opts)?;
    let mut resolver = TagResolver::new(&client);

    let report = pin::upgrade(
        &mut resolver,
        &mut project.files,
        &project.config,
        &target,
        version,
    )?;
    project.save(opts.root)?;

    if opts.json {
        return print_json(&report);
    }
    if report.repos.is_empty() {
        println!("No remote actions to upgrade.");
        return Ok(());
    }
    for repo in &report.repos {
        if repo.updated > 0 {
            println!(
                "Upgraded {} to {} ({}).",
                repo.repository,
                repo.tag,
                short_sha(&repo.commit)
            );
        } else {
            println!(
                "{} is already at {} ({}).",
                repo.repository,
                repo.tag,
                short_sha(&repo.commit)
            );
        }
    }
    print_summary(report.updated, report.files_changed);
    Ok(())
}
