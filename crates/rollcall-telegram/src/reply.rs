//! Outbound replies produced by the dispatcher.
//!
//! Replies are transport-neutral: a text, an optional inline keyboard and a
//! hint about how to deliver it. The Telegram layer decides what each
//! delivery kind means for the update at hand.

/// How a reply should reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Post a new message.
    Send,
    /// Rewrite the message whose button was pressed; post if there is none.
    Edit,
    /// Short pop-up answer to a button press; posted for other events.
    Notice,
}

/// An inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    /// Callback data delivered back as a button press.
    pub tag: String,
}

impl Button {
    pub fn new(label: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
        }
    }
}

/// Rows of inline buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row, the layout every menu uses.
    pub fn column<I>(buttons: I) -> Self
    where
        I: IntoIterator<Item = Button>,
    {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// All callback tags, row by row.
    pub fn tags(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.tag.as_str())
            .collect()
    }
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub delivery: Delivery,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    fn new(delivery: Delivery, text: impl Into<String>) -> Self {
        Self {
            delivery,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn send(text: impl Into<String>) -> Self {
        Self::new(Delivery::Send, text)
    }

    pub fn edit(text: impl Into<String>) -> Self {
        Self::new(Delivery::Edit, text)
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(Delivery::Notice, text)
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
