/// Hints produced by an external prompt classifier. Only the fields the
/// audio core consumes are modeled here; `Workstation::apply_hints` maps
/// them onto tempo and preset choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    pub bpm: Option<u16>,
    pub genre: Option<String>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bpm(mut self, bpm: u16) -> Self {
        self.bpm = Some(bpm);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}
