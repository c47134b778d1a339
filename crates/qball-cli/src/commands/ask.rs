use std::io::{self, BufRead, Write};

use qball_core::{EightBall, SampleMode};

use crate::RemoteArgs;

const WELCOME: &str = "Welcome to the quantum Magic 8-Ball! Type 'q' to quit. \
                       Type your question and let the qubits decide.";

pub fn run(remote: &RemoteArgs, mode: &str) {
    let mode = super::parse_mode(mode);
    let ball = super::make_ball(remote);
    if mode == SampleMode::Remote {
        println!("Remote mode: each answer waits for a job on a physical device.");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = play(&ball, mode, stdin.lock(), &mut stdout) {
        super::fail(e);
    }
}

/// Answer one line at a time until `q` or end of input. Returns answers given.
///
/// A failed draw is reported and the loop keeps going.
pub fn play<R: BufRead, W: Write>(
    ball: &EightBall,
    mode: SampleMode,
    input: R,
    out: &mut W,
) -> io::Result<usize> {
    writeln!(out, "{WELCOME}")?;
    out.flush()?;

    let mut answered = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim() == "q" {
            break;
        }
        match ball.ask(mode) {
            Ok(answer) => {
                writeln!(out, "{}", answer.text)?;
                answered += 1;
            }
            Err(e) => writeln!(out, "The qubits declined to answer: {e}")?,
        }
        writeln!(out)?;
        out.flush()?;
    }
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qball_core::ANSWERS;

    fn ball() -> EightBall {
        EightBall::from_credential(None).unwrap()
    }

    #[test]
    fn answers_each_line_until_quit() {
        let input = "Will it rain?\nShould I deploy on Friday?\nq\nignored\n";
        let mut out = Vec::new();
        let n = play(&ball(), SampleMode::Local, input.as_bytes(), &mut out).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], WELCOME);
        let answers = lines.iter().filter(|l| ANSWERS.contains(l)).count();
        assert_eq!(answers, 2);
    }

    #[test]
    fn stops_at_end_of_input() {
        let mut out = Vec::new();
        let n = play(&ball(), SampleMode::Local, "one\n".as_bytes(), &mut out).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn immediate_quit_gives_no_answers() {
        let mut out = Vec::new();
        let n = play(&ball(), SampleMode::Local, " q \n".as_bytes(), &mut out).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn failed_draw_keeps_the_loop_alive() {
        let mut out = Vec::new();
        let n = play(&ball(), SampleMode::Remote, "a\nb\nq\n".as_bytes(), &mut out).unwrap();
        assert_eq!(n, 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("declined to answer").count(), 2);
    }
}
