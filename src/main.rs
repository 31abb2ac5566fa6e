use molocale::cli;
use molocale::impl_prelude::*;

fn main() {
  if let Err(err) = try_main() {
    molocale::report_critical_error!(err);
    std::process::exit(1);
  }
}

fn try_main() -> AnyResult<()> {
  molocale::init_logging();

  let (arg_parser, all_commands) = cli::create_complete_arg_parser();
  let matches = arg_parser.get_matches();
  let (command_name, command_matches) = match matches.subcommand() {
    Some(v) => v,
    None => bail!("no command was given"),
  };
  // Global options are propagated down into the matches of the subcommand.
  let global_opts = cli::GlobalOpts::from_matches(command_matches);

  log::set_max_level({
    let log_level_from_options =
      if global_opts.verbose { log::LevelFilter::Trace } else { log::LevelFilter::Info };
    log::max_level().min(log_level_from_options)
  });

  // Brace for impact.
  molocale::logging::print_banner_message();

  let command = all_commands
    .into_iter()
    .find(|command| command.name() == command_name)
    .ok_or_else(|| format_err!("unknown command {:?}", command_name))?;
  command.run(global_opts, command_matches)
}
