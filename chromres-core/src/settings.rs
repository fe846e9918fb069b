//! The [`LoadSettings`] structure, used to customise how a RES file is decoded.
use crate::errors::ResError;

/// Options controlling how a file is decoded.
///
/// Unlike the larger settings structures used elsewhere in this family of crates, this format
/// has only two knobs, so setters are simple builder methods rather than a large validated
/// getter/setter surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LoadSettings {
    /// Keep every `reduce`-th sample of every curve. Must be at least 1.
    pub(crate) reduce: usize,
    /// Index into the discovered injection points. Negative values count back from the end,
    /// `-1` (the default) selects the last injection.
    pub(crate) inj_sel: isize,
}

impl Default for LoadSettings {
    fn default() -> Self {
        LoadSettings {
            reduce: 1,
            inj_sel: -1,
        }
    }
}

impl LoadSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample decimation factor. Errs if `reduce` is 0.
    pub fn set_reduce(&mut self, reduce: usize) -> Result<(), ResError> {
        if reduce == 0 {
            return Err(ResError::UnsupportedFormat {
                msg: "reduce must be at least 1".to_string(),
            });
        }
        self.reduce = reduce;
        Ok(())
    }

    pub fn with_reduce(mut self, reduce: usize) -> Result<Self, ResError> {
        self.set_reduce(reduce)?;
        Ok(self)
    }

    pub fn get_reduce(&self) -> usize {
        self.reduce
    }

    pub fn set_inj_sel(&mut self, inj_sel: isize) {
        self.inj_sel = inj_sel;
    }

    pub fn with_inj_sel(mut self, inj_sel: isize) -> Self {
        self.set_inj_sel(inj_sel);
        self
    }

    pub fn get_inj_sel(&self) -> isize {
        self.inj_sel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = LoadSettings::default();
        assert_eq!(s.get_reduce(), 1);
        assert_eq!(s.get_inj_sel(), -1);
    }

    #[test]
    fn reduce_zero_is_rejected() {
        let mut s = LoadSettings::default();
        assert!(s.set_reduce(0).is_err());
    }

    #[test]
    fn builder_methods_chain() {
        let s = LoadSettings::default()
            .with_reduce(4)
            .unwrap()
            .with_inj_sel(2);
        assert_eq!(s.get_reduce(), 4);
        assert_eq!(s.get_inj_sel(), 2);
    }
}
