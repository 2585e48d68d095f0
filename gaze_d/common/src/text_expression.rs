use log::trace;

type ChangeHandler = Box<dyn FnMut(&str) + Send>;

/// Combining diacritics, variation selectors and joiners.
fn is_combining(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{200D}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// Space-delimited word buffer backing the on-screen keyboard.
///
/// Every mutation reports the full new value to the registered handler.
#[derive(Default)]
pub struct TextExpression {
    value: String,
    on_change: Option<ChangeHandler>,
}

impl std::fmt::Debug for TextExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExpression")
            .field("value", &self.value)
            .field("has_handler", &self.on_change.is_some())
            .finish()
    }
}

impl TextExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previously registered handler.
    pub fn on_change<F>(&mut self, handler: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_change = Some(Box::new(handler));
    }

    pub fn clear_handler(&mut self) {
        self.on_change = None;
    }

    fn notify(&mut self) {
        trace!("Expression changed: {:?}", self.value);
        if let Some(handler) = self.on_change.as_mut() {
            handler(&self.value);
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Words of the trimmed value, empty segments dropped.
    pub fn words(&self) -> Vec<&str> {
        self.value
            .trim()
            .split(' ')
            .filter(|w| !w.is_empty())
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.words().len()
    }

    pub fn add(&mut self, word: &str) {
        let mut words: Vec<String> = self.words().into_iter().map(str::to_owned).collect();
        words.push(word.to_owned());
        self.value = words.join(" ");
        self.notify();
    }

    /// Out-of-range indices leave the words unchanged, but the value is still
    /// normalized and the handler still runs.
    pub fn replace_word(&mut self, index: usize, word: &str) {
        let mut words: Vec<String> = self.words().into_iter().map(str::to_owned).collect();
        if let Some(slot) = words.get_mut(index) {
            *slot = word.to_owned();
        }
        self.value = words.join(" ");
        self.notify();
    }

    pub fn replace_last_word(&mut self, word: &str) {
        match self.word_count().checked_sub(1) {
            Some(last) => self.replace_word(last, word),
            None => {
                let normalized = self.words().join(" ");
                self.value = normalized;
                self.notify();
            }
        }
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words().get(index).copied()
    }

    pub fn last_word(&self) -> Option<&str> {
        self.words().last().copied()
    }

    /// Removes the last character, if any, along with any combining marks
    /// that follow it and the rest of a zero-width-joined sequence.
    pub fn backspace(&mut self) {
        while let Some(c) = self.value.pop() {
            if is_combining(c) {
                continue;
            }
            // Joined sequences are removed as one character.
            if !self.value.ends_with('\u{200D}') {
                break;
            }
        }
        self.notify();
    }

    pub fn append(&mut self, text: &str) {
        self.value.push_str(text);
        self.notify();
    }

    pub fn space(&mut self) {
        self.value.push(' ');
        self.notify();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.notify();
    }
}
