//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{Action, AppState, Focus, ScanService, Section};
use super::playback::SEEK_STEP;
use super::AppController;

impl<S: ScanService> AppController<S> {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.dispatch(Action::Quit).await;
            return Ok(());
        }

        let state = self.model.snapshot().await;

        // A notice blocks all other interactions until dismissed or expired
        if state.notice.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.dispatch(Action::DismissNotice).await;
            }
            return Ok(());
        }

        if state.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                self.dispatch(Action::SetHelp(false)).await;
            }
            return Ok(());
        }

        if state.section == Section::Scan && state.focus == Focus::PathInput {
            return self.handle_path_input(key, &state).await;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.dispatch(Action::Quit).await;
            }
            KeyCode::Tab => {
                let forward = !key.modifiers.contains(KeyModifiers::SHIFT);
                self.dispatch(Action::CycleSection { forward }).await;
            }
            KeyCode::BackTab => {
                self.dispatch(Action::CycleSection { forward: false }).await;
            }
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                self.switch_section(Section::ALL[index]).await;
            }
            // Focus the upload input
            KeyCode::Char('/') => {
                self.switch_section(Section::Scan).await;
                self.dispatch(Action::SetFocus(Focus::PathInput)).await;
            }
            KeyCode::Up | KeyCode::Down => {
                let forward = key.code == KeyCode::Down;
                match state.section {
                    Section::Scan => {
                        let effect = self.dispatch(Action::MoveSubpart { forward }).await;
                        self.spawn_effect(effect);
                    }
                    Section::Explore => {
                        self.dispatch(Action::MoveCatalog { forward }).await;
                    }
                    Section::Quiz => {}
                }
            }
            KeyCode::Enter if state.section == Section::Explore => {
                let controller = self.clone();
                let index = state.catalog_selected;
                tokio::spawn(async move {
                    if let Err(e) = controller.activate_catalog_entry(index).await {
                        tracing::debug!(error = %e, "Catalog activation rejected");
                    }
                });
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                self.toggle_playback().await;
            }
            KeyCode::Left => {
                self.seek_by(SEEK_STEP, false).await;
            }
            KeyCode::Right => {
                self.seek_by(SEEK_STEP, true).await;
            }
            KeyCode::Char('[') => {
                self.change_rate(false).await;
            }
            KeyCode::Char(']') => {
                self.change_rate(true).await;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.toggle_accessibility().await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.show_settings().await;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.open_camera().await;
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.dispatch(Action::SetHelp(true)).await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_path_input(&self, key: KeyEvent, state: &AppState) -> Result<()> {
        match key.code {
            KeyCode::Tab => {
                let forward = !key.modifiers.contains(KeyModifiers::SHIFT);
                self.dispatch(Action::CycleSection { forward }).await;
            }
            KeyCode::BackTab => {
                self.dispatch(Action::CycleSection { forward: false }).await;
            }
            KeyCode::Enter => {
                let path = state.upload.path_input.clone();
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.submit_image(&path).await;
                });
            }
            KeyCode::Esc => {
                self.dispatch(Action::SetFocus(Focus::Subparts)).await;
            }
            KeyCode::Backspace => {
                self.dispatch(Action::InputBackspace).await;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(Action::InputClear).await;
            }
            KeyCode::Char(c) => {
                self.dispatch(Action::InputChar(c)).await;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{controller, FakeService};
    use super::*;
    use crate::model::Notice;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_typing_edits_path_until_escape() {
        let controller = controller(FakeService::default());
        for c in "a/b.png".chars() {
            controller.handle_key_event(press(KeyCode::Char(c))).await.unwrap();
        }
        controller.handle_key_event(press(KeyCode::Backspace)).await.unwrap();
        assert_eq!(controller.model.snapshot().await.upload.path_input, "a/b.pn");

        // 'q' is text while the input has focus
        controller.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();
        assert!(!controller.model.should_quit().await);

        controller.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();
        assert!(controller.model.should_quit().await);
    }

    #[tokio::test]
    async fn test_number_keys_switch_sections() {
        let controller = controller(FakeService::default());
        controller.handle_key_event(press(KeyCode::Esc)).await.unwrap();

        controller.handle_key_event(press(KeyCode::Char('2'))).await.unwrap();
        assert_eq!(controller.model.snapshot().await.section, Section::Explore);
        controller.handle_key_event(press(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(controller.model.snapshot().await.section, Section::Quiz);

        controller.handle_key_event(press(KeyCode::Char('/'))).await.unwrap();
        let state = controller.model.snapshot().await;
        assert_eq!((state.section, state.focus), (Section::Scan, Focus::PathInput));
    }

    #[tokio::test]
    async fn test_notice_blocks_keys_until_dismissed() {
        let controller = controller(FakeService::default());
        controller.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        controller.dispatch(Action::RaiseNotice(Notice::info("hello"))).await;

        controller.handle_key_event(press(KeyCode::Char('2'))).await.unwrap();
        assert_eq!(controller.model.snapshot().await.section, Section::Scan);

        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();
        assert!(controller.model.snapshot().await.notice.is_none());
    }

    #[tokio::test]
    async fn test_arrows_move_subpart_selection() {
        let controller = controller(FakeService::default());
        controller.load_organ("heart").await;

        controller.handle_key_event(press(KeyCode::Down)).await.unwrap();
        assert_eq!(controller.model.snapshot().await.subpart_index, Some(1));
        controller.handle_key_event(press(KeyCode::Up)).await.unwrap();
        assert_eq!(controller.model.snapshot().await.subpart_index, Some(0));
    }
}
