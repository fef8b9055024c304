use reinforth::{
    ForthVm, Interpreter, InterpreterStack, RESULT_ASSERTION, RESULT_OK, VmConfig,
    add_native_word, runtime::error,
};
use std::{
    env::args,
    fs::File,
    io::{self, BufWriter, Read},
    process::ExitCode,
};
use tracing_subscriber::EnvFilter;

/// Log to stderr so the program's own output on stdout stays clean.  The filter is read from
/// REINFORTH_LOG.
fn install_tracing() {
    let filter =
        EnvFilter::try_from_env("REINFORTH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Sample extension, `a b -- a+b`, showing how a host adds words of its own.
fn word_host_add(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a.wrapping_add(b));
    Ok(())
}

fn register_host_words(vm: &mut ForthVm) -> error::Result<()> {
    add_native_word!(vm, "host+", word_host_add)?;
    Ok(())
}

fn main() -> ExitCode {
    install_tracing();

    // Run the file named on the command line, or the standard input if there isn't one.
    let (path, input): (String, Box<dyn Read>) = match args().nth(1) {
        Some(path) => match File::open(&path) {
            Ok(file) => (path, Box::new(file)),
            Err(error) => {
                eprintln!("Could not open {}: {}", path, error);
                return ExitCode::FAILURE;
            }
        },
        None => ("stdin".to_string(), Box::new(io::stdin())),
    };

    let output = Box::new(BufWriter::new(io::stdout()));
    let mut vm = ForthVm::with_config(&path, input, output, VmConfig::from_env());

    if let Err(error) = register_host_words(&mut vm) {
        eprintln!("Could not register host words: {}", error);
        return ExitCode::FAILURE;
    }

    match vm.run() {
        RESULT_OK => ExitCode::SUCCESS,

        RESULT_ASSERTION => {
            eprintln!("Assertion failed at {}:{}", path, vm.line_number());
            ExitCode::from(2)
        }

        _ => {
            let message = vm
                .error()
                .map(|error| error.error().clone())
                .unwrap_or_default();

            eprintln!("VM error at {}:{}: {}", path, vm.line_number(), message);
            ExitCode::FAILURE
        }
    }
}
