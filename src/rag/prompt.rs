//! Prompt construction for the completion provider
//!
//! Two fixed system templates (standard analysis vs. forecasting) plus
//! a mode-specific user prompt. The "return only JSON" constraint is
//! restated in the user prompt on purpose: completion providers are
//! unreliable about output format without repetition.

/// System/user message pair for one chat completion
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const STANDARD_SYSTEM_PROMPT: &str = r#"You are a sales data analyst. Analyze the provided sales data and answer the user's question with CONSISTENT and ACCURATE results.

IMPORTANT: The context includes a DATE RANGE header showing the time period covered. All data in the context is from that specific time period.

CRITICAL INSTRUCTIONS:
1. Base your chart data ONLY on the exact data provided in the context
2. The context header shows the date range - use this to understand what time period the data covers
3. If asked meta-questions about data availability, refer to the date range in the context
4. Use the SAME aggregation method every time for the same type of question
5. Sort data consistently (e.g., always by value descending for top products)
6. Round numbers to 2 decimal places for consistency
7. Limit chart data to top 5-10 items for clarity

Your response MUST be a valid JSON object with this exact structure:
{
  "answer": "Your detailed narrative answer here",
  "chartData": {
    "chartType": "bar or line or pie",
    "title": "Chart title",
    "labels": ["Label1", "Label2"],
    "values": [value1, value2]
  }
}

CRITICAL: Return ONLY the raw JSON object. DO NOT wrap in markdown code blocks (```json or ```)

Chart Type Guidelines:
- Use 'bar' for comparisons (products, categories, manufacturers)
- Use 'line' for time series or trends
- Use 'pie' for proportions/percentages (max 5-6 categories)

Always include both 'answer' and 'chartData'. Make sure the JSON is valid and parseable."#;

const PREDICTIVE_SYSTEM_PROMPT: &str = r#"You are an expert sales data analyst with forecasting capabilities. Analyze the provided HISTORICAL sales data and make predictions based on trends.

FORECASTING INSTRUCTIONS:
1. Identify trends in the historical data (growth rate, seasonality, patterns)
2. Calculate year-over-year growth rates or monthly patterns
3. Apply simple linear regression or trend extrapolation
4. Make reasonable predictions based on historical patterns
5. Clearly state assumptions and confidence levels
6. Use 'line' chart type to show historical data + predictions

Your response MUST be a valid JSON object with this exact structure:
{
  "answer": "Your detailed forecast answer including methodology, trends observed, and predicted values with confidence levels",
  "chartData": {
    "chartType": "line",
    "title": "Historical Sales & Forecast",
    "labels": ["2007", "2008", "2009", "2010 (Predicted)"],
    "values": [actual1, actual2, actual3, predicted1]
  }
}

CRITICAL:
- Return ONLY the raw JSON object, NO markdown code blocks or formatting
- DO NOT wrap the response in ```json or ``` markers
- Show historical data AND predictions in the chart
- Clearly label which data points are historical vs predicted
- Explain your forecasting methodology in the answer
- Be transparent about limitations (e.g., 'Based on available data from 2007-2009...')
- Round predictions to 2 decimal places

Always include both 'answer' and 'chartData'. Make sure the JSON is valid and parseable."#;

/// Builds the system/user prompt pair for a question and its context
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, question: &str, context: &str, is_predictive: bool) -> Prompt {
        let system = if is_predictive {
            PREDICTIVE_SYSTEM_PROMPT
        } else {
            STANDARD_SYSTEM_PROMPT
        };

        Prompt {
            system: system.to_string(),
            user: self.user_prompt(question, context, is_predictive),
        }
    }

    fn user_prompt(&self, question: &str, context: &str, is_predictive: bool) -> String {
        if is_predictive {
            format!(
                r#"Question: {question}

Historical Sales Data (Time Series):
{context}

FORECASTING TASK:
1. Analyze the historical trends in the data above
2. Calculate growth rates, identify patterns, and seasonality
3. Apply trend extrapolation or simple linear regression
4. Make a reasonable prediction for the requested future period
5. Explain your methodology and confidence level
6. Create a line chart showing both historical data and predictions

IMPORTANT:
- Be explicit about what data you're using for the forecast
- Show your calculations and assumptions
- Label predicted values clearly in the chart
- Provide a confidence range if possible (e.g., 'predicted $X, with range of $Y-$Z')

Return ONLY the JSON response, nothing else."#
            )
        } else {
            format!(
                r#"Question: {question}

Sales Data Context (sorted by relevance):
{context}

IMPORTANT:
- Aggregate the data consistently
- If asked for 'top N', always sort by the metric descending and take exactly N items
- Use the same calculation method every time
- Round all monetary values to 2 decimal places
- For time-based queries, maintain chronological order

Please analyze this data and provide:
1. A clear narrative answer to the question with specific numbers
2. Chart data that accurately visualizes the key insights (choose appropriate chart type)

Return ONLY the JSON response, nothing else."#
            )
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_prompt_structure() {
        let prompt = PromptBuilder::new().build("top products?", "CONTEXT BLOCK", false);
        assert!(prompt.system.contains("sales data analyst"));
        assert!(!prompt.system.contains("FORECASTING INSTRUCTIONS"));
        assert!(prompt.user.contains("Question: top products?"));
        assert!(prompt.user.contains("CONTEXT BLOCK"));
        assert!(prompt.user.contains("sorted by relevance"));
        assert!(prompt.user.contains("Return ONLY the JSON response"));
    }

    #[test]
    fn test_predictive_prompt_structure() {
        let prompt = PromptBuilder::new().build("predict 2011", "SERIES", true);
        assert!(prompt.system.contains("forecasting capabilities"));
        assert!(prompt.user.contains("Historical Sales Data (Time Series):"));
        assert!(prompt.user.contains("FORECASTING TASK"));
        assert!(prompt.user.contains("Return ONLY the JSON response"));
    }

    #[test]
    fn test_system_prompts_demand_json_contract() {
        for is_predictive in [false, true] {
            let prompt = PromptBuilder::new().build("q", "c", is_predictive);
            assert!(prompt.system.contains("\"answer\""));
            assert!(prompt.system.contains("\"chartData\""));
            assert!(prompt.system.contains("Return ONLY the raw JSON object"));
        }
    }
}
