use clap::{arg,crate_version,Command};
use huffchat::{client, frame, server, word_huff};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::init();

    let long_help =
"Examples:
---------
Run a broker:   `huffchat serve -p 9000`
Join the chat:  `huffchat connect -s 127.0.0.1 -p 9000 -u alice`
Pack a file:    `huffchat compress -i notes.txt -o notes.hc`
Unpack again:   `huffchat expand -i notes.hc -o notes.txt`";

    let mut main_cmd = Command::new("huffchat")
        .about("Chat with word-level adaptive Huffman compression")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("serve")
        .arg(arg!(-p --port [PORT] "listening port").value_parser(clap::value_parser!(u16)))
        .about("run the chat broker"));

    main_cmd = main_cmd.subcommand(Command::new("connect")
        .arg(arg!(-s --server [HOST] "broker host"))
        .arg(arg!(-p --port [PORT] "broker port").value_parser(clap::value_parser!(u16)))
        .arg(arg!(-u --user [NAME] "display name"))
        .about("join a chat broker"));

    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a text file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a compressed text file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("serve") {
        let port = match cmd.get_one::<u16>("port") {
            Some(port) => *port,
            None => frame::DEFAULT_PORT
        };
        return server::serve(port);
    }

    if let Some(cmd) = matches.subcommand_matches("connect") {
        let host = match cmd.get_one::<String>("server") {
            Some(host) => host.to_string(),
            None => client::DEFAULT_HOST.to_string()
        };
        let port = match cmd.get_one::<u16>("port") {
            Some(port) => *port,
            None => frame::DEFAULT_PORT
        };
        let user = match cmd.get_one::<String>("user") {
            Some(user) => user.to_string(),
            None => client::DEFAULT_USER.to_string()
        };
        return client::connect(&host,port,&user);
    }

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let text = std::fs::read_to_string(path_in)?;
        let codec = word_huff::WordCodec::new();
        let packed = codec.encode(&text)?;
        std::fs::write(path_out,packed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let packed = std::fs::read(path_in)?;
        let codec = word_huff::WordCodec::new();
        let text = codec.decode(&packed)?;
        std::fs::write(path_out,text)?;
    }

    Ok(())
}
