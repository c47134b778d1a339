//! The Magic 8-Ball: twenty answers, one uniformly sampled index.

use crate::sampler::{SampleMode, Sampler, SamplerConfig, SamplerError};

/// Every answer the ball can give. Ten lean yes, five lean no, five are non-committal.
pub const ANSWERS: [&str; 20] = [
    "The wavefunction collapsed to a positive outcome",
    "Your question has been projected into a |+> state",
    "the electron spin is giving that a huge thumbs up by the right hand rule",
    "The quantum algorithm solved it - 'yes' is the answer!",
    "Unitary evolution of your state leads to a definite YES",
    "The expectation value of that observable is a clear affirmative",
    "The qubits have spoken. Go for it!",
    "The wavefunction's interference pattern suggests success",
    "Alice and Bob measured NO so that means you will measure YES!",
    "Is Schrodenger's cat dead or alive? YES!",
    "The wavefunction collapsed to NO!",
    "NO, The wavefunctions have destructively interfered",
    "Even the electron spin is giving a thumbs down by the right hand rule",
    "There is no branch of the wavefunction where that is a good idea",
    "The expectation value of that observable is an obvious NO",
    "Heisenberg might agree with you, but we can't be 100% certain",
    "Your fate is in superposition - it could go either way!",
    "The state is still in a superposition. Maybe try measuring again",
    "Even Schodenger has no clue!",
    "The outcome depends on your measurement basis",
];

/// A drawn answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub index: usize,
    pub text: &'static str,
}

pub struct EightBall {
    sampler: Sampler,
}

impl EightBall {
    /// Wrap a sampler whose range matches the answer table.
    pub fn new(sampler: Sampler) -> Result<Self, SamplerError> {
        if sampler.range() != ANSWERS.len() as u64 {
            return Err(SamplerError::InvalidArgument(format!(
                "sampler range {} does not match {} answers",
                sampler.range(),
                ANSWERS.len()
            )));
        }
        Ok(Self { sampler })
    }

    /// Config for a sampler sized to the answer table.
    pub fn config() -> SamplerConfig {
        // ANSWERS.len() is a constant > 1, so this cannot fail.
        match SamplerConfig::new(ANSWERS.len() as u64) {
            Ok(config) => config,
            Err(e) => unreachable!("answer table too small: {e}"),
        }
    }

    /// Simulator-backed ball, with remote mode available when `credential` is set.
    pub fn from_credential(credential: Option<String>) -> Result<Self, SamplerError> {
        Self::new(Sampler::new(Self::config().with_credential(credential))?)
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Ask the ball a question. The question itself is not consulted.
    pub fn ask(&self, mode: SampleMode) -> Result<Answer, SamplerError> {
        let index = self.sampler.sample(mode)? as usize;
        Ok(Answer {
            index,
            text: ANSWERS[index],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_table_has_twenty_distinct_entries() {
        let mut unique: Vec<_> = ANSWERS.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn answer_table_wording_is_verbatim() {
        assert_eq!(
            ANSWERS[2],
            "the electron spin is giving that a huge thumbs up by the right hand rule"
        );
        assert_eq!(ANSWERS[3], "The quantum algorithm solved it - 'yes' is the answer!");
        assert_eq!(ANSWERS[9], "Is Schrodenger's cat dead or alive? YES!");
        assert_eq!(ANSWERS[11], "NO, The wavefunctions have destructively interfered");
        assert_eq!(ANSWERS[18], "Even Schodenger has no clue!");
        assert!(ANSWERS.iter().all(|a| a.is_ascii()));
    }

    #[test]
    fn rejects_mismatched_range() {
        let sampler = Sampler::new(SamplerConfig::new(8).unwrap()).unwrap();
        assert!(matches!(
            EightBall::new(sampler),
            Err(SamplerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn ask_returns_table_entry() {
        let ball = EightBall::from_credential(None).unwrap();
        for _ in 0..50 {
            let answer = ball.ask(SampleMode::Local).unwrap();
            assert_eq!(answer.text, ANSWERS[answer.index]);
        }
    }

    #[test]
    fn remote_without_credential_is_invalid() {
        let ball = EightBall::from_credential(None).unwrap();
        assert!(matches!(
            ball.ask(SampleMode::Remote),
            Err(SamplerError::InvalidArgument(_))
        ));
    }
}
