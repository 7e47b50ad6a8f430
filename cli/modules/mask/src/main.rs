mod cfg;
mod cmd;
mod output;
mod service;

use std::error::Error;

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;
use tmc::logging;

use crate::{cmd::Cmd, service::MaskService};

////////////////////////////////////////////////////////////////////////////////

fn run(cmd: Cmd) -> Result<(), Box<dyn Error>> {
    let service = MaskService::new(cmd.width, cmd.format);
    service.handle_cmd(cmd.mode)
}

////////////////////////////////////////////////////////////////////////////////

pub fn main() {
    CompleteEnv::with_factory(Cmd::command).complete();
    let cmd = Cmd::parse();

    logging::init(module_path!(), cmd.verbosity as usize).expect("failed to initialize logging");

    if let Err(err) = run(cmd) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
