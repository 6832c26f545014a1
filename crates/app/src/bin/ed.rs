use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "ed", about = "Line-oriented text editor")]
struct Cli {
    /// File to edit
    file: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    edtools::init_logging();

    let cli = Cli::parse();
    let mut editor = ed::Editor::new();

    if let Some(path) = &cli.file {
        // A file that cannot be read still becomes the current filename.
        if let Err(err) = editor.edit(path) {
            log::debug!("cannot open {}: {err}", path.display());
            println!("?{err}");
            editor.record_error(&err);
            editor.set_filename(path);
        }
    }

    let mut session = ed::Session::new(editor, std::io::stdout());

    session.run(std::io::BufReader::new(std::io::stdin()))?;

    Ok(())
}
