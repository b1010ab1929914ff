use clap::Parser;
use miette::Result;
use backcheck::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    backcheck::core::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Size(args) => backcheck::cli::commands::size::run(args, &global),
        Commands::Backward(args) => backcheck::cli::commands::backward::run(args, &global),
        Commands::Pattern(args) => backcheck::cli::commands::pattern::run(args, &global),
        Commands::Iso(args) => backcheck::cli::commands::iso::run(args, &global),
        Commands::Stratify(args) => backcheck::cli::commands::stratify::run(args, &global),
        Commands::Reference(args) => backcheck::cli::commands::reference::run(args, &global),
        Commands::Completions(args) => backcheck::cli::commands::completions::run(args),
    }
}
