use uniplan_llm::{Message, Tool, ToolCall, ToolChoice};
use serde_json::json;

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::user("Hello").role(), "user");
    assert_eq!(Message::assistant("Hi there!").role(), "assistant");
    assert_eq!(Message::tool_result("call_123", "42").role(), "tool");
}

#[test]
fn test_message_serialization_user() {
    let msg = Message::user("Find universities in California");
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value, json!({"role": "user", "content": "Find universities in California"}));
}

#[test]
fn test_assistant_with_tools_serialization() {
    let call = ToolCall::new("call_1", "get_weather_data", r#"{"location":"Boston"}"#);
    let msg = Message::assistant_with_tools(vec![call]);
    let value = serde_json::to_value(&msg).unwrap();

    assert_eq!(value["role"], "assistant");
    assert!(value.get("content").is_none());
    assert_eq!(value["tool_calls"][0]["type"], "function");
    assert_eq!(value["tool_calls"][0]["function"]["name"], "get_weather_data");
}

#[test]
fn test_assistant_without_tools_omits_field() {
    let value = serde_json::to_value(Message::assistant("Report")).unwrap();
    assert!(value.get("tool_calls").is_none());
}

#[test]
fn test_message_deserialization_with_null_content() {
    let json = r#"{"role":"assistant","content":null}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.role(), "assistant");
    assert_eq!(msg.text(), None);
}

#[test]
fn test_tool_result_message_format() {
    let value = serde_json::to_value(Message::tool_result("call_9", "Sunny")).unwrap();
    assert_eq!(value, json!({"role": "tool", "tool_call_id": "call_9", "content": "Sunny"}));
}

#[test]
fn test_tool_definition() {
    let tool = Tool::function(
        "university_search",
        "Search for universities",
        json!({"type": "object", "properties": {"location": {"type": "string"}}}),
    );
    assert_eq!(tool.tool_type, "function");
    assert_eq!(tool.name(), "university_search");

    let value = serde_json::to_value(&tool).unwrap();
    assert_eq!(value["function"]["description"], "Search for universities");
}

#[test]
fn test_tool_call_parse_arguments() {
    #[derive(serde::Deserialize)]
    struct Args {
        institution: String,
    }

    let call = ToolCall::new("call_1", "university_comparison", r#"{"institution":"Harvard,MIT"}"#);
    let args: Args = call.parse_arguments().unwrap();
    assert_eq!(args.institution, "Harvard,MIT");
}

#[test]
fn test_tool_call_deserializes_without_type() {
    let call: ToolCall = serde_json::from_value(json!({
        "id": "call_2",
        "function": {"name": "cost_analysis", "arguments": "{}"}
    }))
    .unwrap();
    assert_eq!(call.tool_type, "function");
}

#[test]
fn test_tool_choice_variants() {
    assert_eq!(serde_json::to_string(&ToolChoice::None).unwrap(), "\"none\"");
    assert_eq!(serde_json::to_string(&ToolChoice::Auto).unwrap(), "\"auto\"");
}
