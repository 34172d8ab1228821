use clap::{value_parser, Arg, ArgAction, Command};

pub fn ask() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("secret")
                .short('s')
                .long("secret")
                .help("Secret to sign and authenticate tokens. Can also be provided in the .joblyrc file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Makes Jobly verbose. Useful for debugging and seeing what's going on \"under the hood\""),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to .joblyrc file")
                .global(true)
                .default_value(".joblyrc"),
        )
        .subcommand(
            Command::new("serve")
                .about("Start the jobly API")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Custom server port")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("database")
                        .short('d')
                        .long("database")
                        .help("Database directory"),
                )
                .arg(
                    Arg::new("interpolate-filters")
                        .long("interpolate-filters")
                        .action(ArgAction::SetTrue)
                        .help("Write filter values straight into the SQL text instead of binding them. Unsafe, kept for legacy clients"),
                ),
        )
        .subcommand(
            Command::new("token")
                .about("Create a token based on the secret to authorize API calls")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("User the token is issued for")
                        .required(true),
                )
                .arg(
                    Arg::new("admin")
                        .short('a')
                        .long("admin")
                        .action(ArgAction::SetTrue)
                        .help("Grant admin rights"),
                )
                .arg(
                    Arg::new("duration")
                        .short('d')
                        .long("duration")
                        .help("Token duration until expires in minutes")
                        .value_parser(value_parser!(i64))
                        .default_value("43800"),
                ),
        )
}
