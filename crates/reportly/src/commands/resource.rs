//! Resource subcommand handlers, shared by every resource type.

use reportly_core::{CoreError, DataService, Filters, SortDirection, Tabulate, Tabulation};

use crate::cli::{GlobalOpts, OutputFormat, ResourceArgs, ResourceCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle<R: Tabulate>(
    service: &DataService<R>,
    args: ResourceArgs,
    command_name: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let list_command = format!("{command_name} list");
    let core_err = |e: CoreError| CliError::from_core(e, &list_command);

    match args.command {
        ResourceCommand::List(list) => {
            let filters: Filters = list.filter.into_iter().collect();
            service.fetch_all(&filters).await.map_err(core_err)?;

            let tabulation = Tabulation {
                search_term: list.search,
                sort_column: list.sort,
                sort_direction: if list.desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
                page: list.page,
                page_size: list.page_size,
            };
            let page = tabulation
                .apply(&service.current_snapshot())
                .map_err(core_err)?;

            let out = output::render_page(global.output, &page)?;
            output::print_output(&out, global.quiet);
            if global.output == OutputFormat::Table && !global.quiet {
                eprintln!(
                    "page {}/{} ({} {})",
                    page.page,
                    page.page_count().max(1),
                    page.total,
                    R::PLURAL.to_lowercase()
                );
            }
            Ok(())
        }

        ResourceCommand::Get { id } => {
            let record = service.fetch_one(id).await.map_err(core_err)?;
            let out = output::render_record(global.output, &record)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::Create(payload) => {
            let body = util::read_payload(&payload)?;
            let record: R = serde_json::from_value(body)?;
            let created = service.create(&record).await.map_err(core_err)?;
            let out = output::render_record(global.output, &created)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::Update { id, payload } => {
            let patch = util::read_payload(&payload)?;

            // Mirror the current record first so the update lands in the cache.
            let current = service.fetch_one(id).await.map_err(core_err)?;
            let mut body = serde_json::to_value(&current)?;
            util::merge_object(&mut body, patch)?;
            if let Some(obj) = body.as_object_mut() {
                obj.insert("id".into(), id.into());
            }

            let record: R = serde_json::from_value(body)?;
            let updated = service.update(&record).await.map_err(core_err)?;
            let out = output::render_record(global.output, &updated)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::Delete { id } => {
            let current = service.fetch_one(id).await.map_err(core_err)?;
            if !global.quiet && global.output == OutputFormat::Table {
                eprintln!("{}", output::render_record(OutputFormat::Table, &current)?);
            }

            let prompt = format!("Delete {} record {id}?", R::SINGULAR.to_lowercase());
            if !util::confirm(&prompt, &format!("{command_name} delete"), global.yes)? {
                return Ok(());
            }

            let count = service.delete(id).await.map_err(core_err)?;
            if global.output == OutputFormat::Plain {
                output::print_output(&count.to_string(), global.quiet);
            }
            Ok(())
        }
    }
}
