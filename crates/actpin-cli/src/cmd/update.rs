use super::{no_usages, print_summary, print_warnings, Options, Project};
use crate::output::{print_json, print_table, short_sha};
use actpin_core::pin::{self, Target, UpdateReport};
use actpin_core::resolver::TagResolver;

pub fn run(opts: &Options<'_>, repository: Option<&str>, all: bool) -> anyhow::Result<()> {
    let target = match (repository, all) {
        (None, true) => Target::All,
        (Some(repo), false) => Target::repository(repo)?,
        _ => anyhow::bail!("specify either owner/repo or --all"),
    };

    let Some(mut project) = Project::load(opts)? else {
        return no_usages(opts, &UpdateReport::default());
    };
    let client = project.client(opts)?;
    let mut resolver = TagResolver::new(&client);

    let report = pin::update(&mut resolver, &mut project.files, &project.config, &target)?;
    project.save(opts.root)?;

    if opts.json {
        return print_json(&report);
    }
    print_warnings(opts.root, &report.warnings);

    if !report.records.is_empty() {
        let rows = report
            .records
            .iter()
            .map(|r| {
                vec![
                    r.repository.clone(),
                    r.spec.clone(),
                    r.tag.clone(),
                    short_sha(&r.commit).to_string(),
                    r.updated.to_string(),
                    r.unchanged.to_string(),
                ]
            })
            .collect();
        print_table(
            &["REPOSITORY", "SPEC", "TAG", "COMMIT", "UPDATED", "UNCHANGED"],
            rows,
        );
    }
    print_summary(report.updated, report.files_changed);
    Ok(())
}
