use anyhow::Result;

use groovebox::prompt::Hints;
use groovebox::workstation::Workstation;

// Catches allocations in the audio callback during development.
#[cfg(debug_assertions)]
#[global_allocator]
static ALLOC: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let bpm = std::env::args().nth(1).and_then(|arg| arg.parse::<u16>().ok());

    let (mut workstation, engine) = Workstation::new();
    workstation.initialize_audio(engine)?;
    if let Some(bpm) = bpm {
        workstation.apply_hints(&Hints::new().with_bpm(bpm));
    }

    workstation.toggle_sequencer()?;
    println!(
        "playing the default pattern at {} bpm, press enter to stop",
        workstation.tempo()
    );

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    workstation.toggle_sequencer()?;
    Ok(())
}
