use clap::Parser;
use contactcrm::cli::{
    run_add, run_delete, run_list, run_note, run_serve, run_show, run_tags, run_task, Cli,
    Commands,
};
use contactcrm::config::Config;
use contactcrm::db::Database;
use contactcrm::models::NewContact;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The server reports each request; one-shot commands stay quiet
    let default_level = if matches!(cli.command, Commands::Serve(_)) {
        "info"
    } else {
        "warn"
    };
    init_logging(default_level, cli.verbose, cli.quiet);

    let config = Config::resolve(cli.db)?;
    log::debug!("Using database {}", config.db_path.display());

    // Schema changes happen only through `migrate`; everything else expects
    // a migrated database.
    let open = || Database::open_at(&config.db_path);

    match cli.command {
        Commands::Migrate => {
            let version = Database::migrate_at(&config.db_path)?;
            println!("Schema at version {} ({})", version, config.db_path.display());
        }
        Commands::Serve(args) => {
            run_serve(&config, &args.host, args.port)?;
        }
        Commands::List(args) => {
            run_list(&open()?, args.search.as_deref(), args.tag.as_deref(), args.json)?;
        }
        Commands::Tags => {
            run_tags(&open()?)?;
        }
        Commands::Show(args) => {
            run_show(&open()?, args.id, args.json)?;
        }
        Commands::Add(args) => {
            let contact = NewContact {
                name: args.name,
                email: args.email,
                phone: args.phone,
                tags: args.tags,
                notes: args.notes,
            };
            run_add(&open()?, contact)?;
        }
        Commands::Delete(args) => {
            run_delete(&open()?, args.id)?;
        }
        Commands::Note(args) => {
            run_note(&open()?, args.contact_id, &args.text)?;
        }
        Commands::Task(args) => {
            run_task(&open()?, args.command)?;
        }
    }

    Ok(())
}

fn init_logging(default_level: &str, verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}
