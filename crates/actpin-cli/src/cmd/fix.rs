use super::{no_usages, print_summary, print_warnings, Options, Project};
use crate::output::print_json;
use actpin_core::pin::{self, FixReport};
use actpin_core::resolver::TagResolver;

pub fn run(opts: &Options<'_>) -> anyhow::Result<()> {
    let Some(mut project) = Project::load(opts)? else {
        return no_usages(opts, &FixReport::default());
    };
    let client = project.client(opts)?;
    let mut resolver = TagResolver::new(&client);

    let report = pin::fix(&mut resolver, &mut project.files, &project.config);
    project.save(opts.root)?;

    if opts.json {
        return print_json(&report);
    }
    print_warnings(opts.root, &report.warnings);
    print_summary(report.updated, report.files_changed);
    Ok(())
}
