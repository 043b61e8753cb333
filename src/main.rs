use clap::Parser;

fn main() {
    let cli = mirrorsync::cli::Cli::parse();
    std::process::exit(mirrorsync::app::run(cli));
}
