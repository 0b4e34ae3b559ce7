use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::locator::locator_model::LocatorCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Java,
    Python,
    #[value(name = "javascript")]
    JavaScript,
    #[value(name = "csharp")]
    #[serde(rename = "csharp")]
    CSharp,
}

impl Language {
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Java => "Java",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::CSharp => "C#",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    Selenium,
    Playwright,
    Cypress,
    Puppeteer,
    #[value(name = "testcafe")]
    #[serde(rename = "testcafe")]
    TestCafe,
    #[value(name = "webdriverio")]
    #[serde(rename = "webdriverio")]
    WebDriverIO,
    RobotFramework,
    KatalonStudio,
}

impl Tool {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Selenium => "Selenium",
            Tool::Playwright => "Playwright",
            Tool::Cypress => "Cypress",
            Tool::Puppeteer => "Puppeteer",
            Tool::TestCafe => "TestCafe",
            Tool::WebDriverIO => "WebDriverIO",
            Tool::RobotFramework => "Robot Framework",
            Tool::KatalonStudio => "Katalon Studio",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The free-text inputs describing what to automate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenRequest {
    pub language: Language,
    pub tool: Tool,
    pub test_case: String,
    pub test_data: String,
    /// Empty when the page came from raw HTML.
    pub start_url: String,
    pub test_steps: String,
}

/// A system instruction plus one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

pub fn build_system_prompt(request: &CodegenRequest) -> String {
    format!(
        r#"You are an expert automation engineer.
You will receive:
1. A natural language test case
2. Optional test data
3. A list of extracted elements with variable_name and xpath

Your job:
- Map each step of the test case ONLY to elements in the provided list.
- Generate executable {language} code using {tool}.
- Prefer By.id, By.name, By.cssSelector over XPath when possible.
- If an element does not exist in the list, insert a TODO comment instead of inventing a locator."#,
        language = request.language,
        tool = request.tool,
    )
}

pub fn build_user_prompt(request: &CodegenRequest, locators: &LocatorCollection) -> String {
    let available = if locators.is_empty() {
        "(none)".to_string()
    } else {
        locators.available_elements()
    };

    format!(
        r#"Generate a code snippet in {language} that performs the following task.

Test case: "{test_case}"
Data: "{test_data}"
Start URL: "{url}"
Test Steps: "{test_steps}"

Selector rules:
- Prefer: By.name, By.id, or CSS selectors
- Use XPath only if no other option is available
Available Elements:
{available}

Generate {language} code using {tool} that automates this test steps.

STRICT OUTPUT INSTRUCTION:
Return only valid {language} code with necessary imports. Do NOT include markdown, explanations, comments, or extra formatting."#,
        language = request.language,
        tool = request.tool,
        test_case = request.test_case,
        test_data = request.test_data,
        url = request.start_url,
        test_steps = request.test_steps,
    )
}

pub fn build_prompt(request: &CodegenRequest, locators: &LocatorCollection) -> ChatPrompt {
    ChatPrompt {
        system: build_system_prompt(request),
        user: build_user_prompt(request, locators),
    }
}
