use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    spm completions bash > ~/.bash_completion.d/spm\n\n\
                  Generate zsh completions:\n    spm completions zsh > ~/.zfunc/_spm\n\n\
                  Generate fish completions:\n    spm completions fish > ~/.config/fish/completions/spm.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
