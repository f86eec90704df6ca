use automator_types::Page;

/// Highlighted row per list page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSelection {
    workflows: usize,
    executions: usize,
    extracted: usize,
}

impl ListSelection {
    fn slot(&mut self, page: &Page) -> Option<&mut usize> {
        match page {
            Page::Workflows => Some(&mut self.workflows),
            Page::Executions => Some(&mut self.executions),
            Page::Extracted => Some(&mut self.extracted),
            Page::ExecutionDetail(_) => None,
        }
    }

    pub fn get(&self, page: &Page) -> usize {
        match page {
            Page::Workflows => self.workflows,
            Page::Executions => self.executions,
            Page::Extracted => self.extracted,
            Page::ExecutionDetail(_) => 0,
        }
    }

    pub fn move_up(&mut self, page: &Page) {
        if let Some(index) = self.slot(page) {
            *index = index.saturating_sub(1);
        }
    }

    pub fn move_down(&mut self, page: &Page, len: usize) {
        if let Some(index) = self.slot(page)
            && *index + 1 < len
        {
            *index += 1;
        }
    }

    /// Keep the highlight inside a freshly loaded list.
    pub fn clamp(&mut self, page: &Page, len: usize) {
        if let Some(index) = self.slot(page) {
            *index = (*index).min(len.saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_within_bounds() {
        let mut selection = ListSelection::default();
        selection.move_up(&Page::Workflows);
        assert_eq!(selection.get(&Page::Workflows), 0);
        selection.move_down(&Page::Workflows, 2);
        selection.move_down(&Page::Workflows, 2);
        assert_eq!(selection.get(&Page::Workflows), 1);
        selection.clamp(&Page::Workflows, 0);
        assert_eq!(selection.get(&Page::Workflows), 0);
        assert_eq!(selection.get(&Page::Executions), 0);
    }
}
