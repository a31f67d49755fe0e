use nameboard::controller::{Command, CommentForm, SearchForm, ShowForm};
use nameboard::models::{SearchField, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Register,
    Bind,
    NewShow,
    Search,
    Comment { show_id: u64 },
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Choice { options: &'static [&'static str], index: usize },
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    fn text(label: &'static str, initial: &str) -> Self {
        Self { label, value: FieldValue::Text(initial.to_string()) }
    }

    fn choice(label: &'static str, options: &'static [&'static str]) -> Self {
        Self { label, value: FieldValue::Choice { options, index: 0 } }
    }

    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Choice { options, index } => format!("< {} >", options[*index]),
        }
    }
}

/// Modal input form. Text fields take typed characters; choice fields cycle
/// with space or the arrow keys.
#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focused: usize,
}

const SEARCH_FIELDS: &[&str] = &["owner", "tix"];
const MATCH_MODES: &[&str] = &["exact", "partial"];
const VISIBILITIES: &[&str] = &["public", "private"];

impl Form {
    pub fn new(kind: FormKind, user_name: &str, viewer_name: &str) -> Self {
        let fields = match kind {
            FormKind::Register => vec![Field::text("name", "")],
            FormKind::Bind => vec![Field::text("user_id", "")],
            FormKind::NewShow => {
                vec![Field::text("owner name", user_name), Field::text("ticket name", ""), Field::text("show name", "")]
            }
            FormKind::Search => vec![
                Field::text("name", ""),
                Field::choice("field", SEARCH_FIELDS),
                Field::choice("match", MATCH_MODES),
            ],
            FormKind::Comment { .. } => vec![
                Field::text("author", user_name),
                Field::text("content", ""),
                Field::choice("visibility", VISIBILITIES),
            ],
            FormKind::Viewer => vec![Field::text("viewer name", viewer_name)],
        };
        Self { kind, fields, focused: 0 }
    }

    pub fn title(&self) -> String {
        match self.kind {
            FormKind::Register => "Register".to_string(),
            FormKind::Bind => "Bind existing user_id".to_string(),
            FormKind::NewShow => "New show".to_string(),
            FormKind::Search => "Search shows".to_string(),
            FormKind::Comment { show_id } => format!("Comment on #{show_id}"),
            FormKind::Viewer => "Viewer name".to_string(),
        }
    }

    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }

    pub fn input_char(&mut self, c: char) {
        if let FieldValue::Text(text) = &mut self.fields[self.focused].value {
            text.push(c);
        } else if c == ' ' {
            self.cycle();
        }
    }

    pub fn backspace(&mut self) {
        if let FieldValue::Text(text) = &mut self.fields[self.focused].value {
            text.pop();
        }
    }

    pub fn cycle(&mut self) {
        if let FieldValue::Choice { options, index } = &mut self.fields[self.focused].value {
            *index = (*index + 1) % options.len();
        }
    }

    fn text(&self, i: usize) -> String {
        match &self.fields[i].value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Choice { options, index } => options[*index].to_string(),
        }
    }

    fn choice(&self, i: usize) -> usize {
        match &self.fields[i].value {
            FieldValue::Choice { index, .. } => *index,
            FieldValue::Text(_) => 0,
        }
    }

    pub fn into_command(self) -> Command {
        match self.kind {
            FormKind::Register => Command::Register { user_name: self.text(0) },
            FormKind::Bind => Command::Bind { user_id: self.text(0) },
            FormKind::NewShow => Command::CreateShow(ShowForm {
                user_name: self.text(0),
                tix_name: self.text(1),
                show_name: self.text(2),
            }),
            FormKind::Search => Command::Search(SearchForm {
                name: self.text(0),
                field: if self.choice(1) == 0 { SearchField::Owner } else { SearchField::Tix },
                exact: self.choice(2) == 0,
            }),
            FormKind::Comment { show_id } => Command::SubmitComment {
                show_id,
                form: CommentForm {
                    author: self.text(0),
                    content: self.text(1),
                    visibility: if self.choice(2) == 0 { Visibility::Public } else { Visibility::Private },
                },
            },
            FormKind::Viewer => Command::SetViewerName(self.text(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut Form, s: &str) {
        s.chars().for_each(|c| form.input_char(c));
    }

    #[test]
    fn search_form_builds_partial_tix_query() {
        let mut form = Form::new(FormKind::Search, "", "");
        type_str(&mut form, "Chen");
        form.next_field();
        form.input_char(' ');
        form.next_field();
        form.cycle();
        match form.into_command() {
            Command::Search(s) => {
                assert_eq!(s.name, "Chen");
                assert_eq!(s.field, SearchField::Tix);
                assert!(!s.exact);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn comment_form_prefills_author_and_toggles_visibility() {
        let mut form = Form::new(FormKind::Comment { show_id: 8 }, "Alice", "");
        form.next_field();
        type_str(&mut form, "see you");
        form.backspace();
        form.prev_field();
        form.prev_field();
        form.cycle();
        match form.into_command() {
            Command::SubmitComment { show_id, form } => {
                assert_eq!(show_id, 8);
                assert_eq!(form.author, "Alice");
                assert_eq!(form.content, "see yo");
                assert_eq!(form.visibility, Visibility::Private);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn new_show_prefills_owner_name() {
        let form = Form::new(FormKind::NewShow, "Alice", "");
        assert_eq!(form.fields[0].display(), "Alice");
        assert_eq!(form.fields.len(), 3);
    }
}
